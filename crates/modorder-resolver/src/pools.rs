//! The two disjoint, ordered module pools.

use std::collections::HashSet;

use modorder_core::module::Module;

use crate::error::PoolError;

/// Which pool a module currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Active,
    Inactive,
}

/// Active and inactive modules. An identifier is in at most one of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pools {
    active: Vec<Module>,
    inactive: Vec<Module>,
    active_ids: HashSet<String>,
}

impl Pools {
    /// Build pools from loader output, dropping duplicate identifiers.
    ///
    /// The first occurrence wins and active entries are considered before
    /// inactive ones.
    pub fn new(active: Vec<Module>, inactive: Vec<Module>) -> Self {
        let mut seen = HashSet::new();
        let mut keep = |m: &Module| {
            if seen.insert(m.id.clone()) {
                true
            } else {
                tracing::warn!("Dropping duplicate module '{}'", m);
                false
            }
        };
        let active: Vec<Module> = active.into_iter().filter(|m| keep(m)).collect();
        let inactive: Vec<Module> = inactive.into_iter().filter(|m| keep(m)).collect();
        let active_ids = active.iter().map(|m| m.id.clone()).collect();
        Self {
            active,
            inactive,
            active_ids,
        }
    }

    pub fn active(&self) -> &[Module] {
        &self.active
    }

    pub fn inactive(&self) -> &[Module] {
        &self.inactive
    }

    /// Identifiers of all active modules.
    pub fn active_ids(&self) -> &HashSet<String> {
        &self.active_ids
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_ids.contains(id)
    }

    pub fn locate(&self, id: &str) -> Option<(PoolKind, usize)> {
        if let Some(i) = self.active.iter().position(|m| m.id == id) {
            return Some((PoolKind::Active, i));
        }
        self.inactive
            .iter()
            .position(|m| m.id == id)
            .map(|i| (PoolKind::Inactive, i))
    }

    pub fn find(&self, id: &str) -> Option<&Module> {
        match self.locate(id)? {
            (PoolKind::Active, i) => self.active.get(i),
            (PoolKind::Inactive, i) => self.inactive.get(i),
        }
    }

    /// Display name of a known module, or the identifier itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.find(id).map(Module::display_name).unwrap_or(id)
    }

    /// Move a module from the inactive pool to the end of the active pool.
    pub fn activate(&mut self, id: &str) -> Result<(), PoolError> {
        match self.locate(id) {
            Some((PoolKind::Inactive, i)) => {
                let mut module = self.inactive.remove(i);
                module.load_order = None;
                self.active_ids.insert(module.id.clone());
                self.active.push(module);
                Ok(())
            }
            Some((PoolKind::Active, _)) => Err(PoolError::AlreadyActive { id: id.to_string() }),
            None => Err(PoolError::UnknownModule { id: id.to_string() }),
        }
    }

    /// Move a module from the active pool to the end of the inactive pool.
    pub fn deactivate(&mut self, id: &str) -> Result<(), PoolError> {
        match self.locate(id) {
            Some((PoolKind::Active, i)) => {
                let mut module = self.active.remove(i);
                module.load_order = None;
                self.active_ids.remove(&module.id);
                self.inactive.push(module);
                Ok(())
            }
            Some((PoolKind::Inactive, _)) => {
                Err(PoolError::AlreadyInactive { id: id.to_string() })
            }
            None => Err(PoolError::UnknownModule { id: id.to_string() }),
        }
    }

    /// Exchange the positions of two modules within the same pool.
    pub fn swap(&mut self, first: &str, second: &str) -> Result<(), PoolError> {
        let a = self
            .locate(first)
            .ok_or_else(|| PoolError::UnknownModule { id: first.to_string() })?;
        let b = self
            .locate(second)
            .ok_or_else(|| PoolError::UnknownModule { id: second.to_string() })?;
        match (a, b) {
            ((PoolKind::Active, i), (PoolKind::Active, j)) => self.active.swap(i, j),
            ((PoolKind::Inactive, i), (PoolKind::Inactive, j)) => self.inactive.swap(i, j),
            _ => {
                return Err(PoolError::DifferentPools {
                    first: first.to_string(),
                    second: second.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Move a module to the end of whichever pool holds it.
    pub fn move_to_end(&mut self, id: &str) -> Result<(), PoolError> {
        let pool = match self.locate(id) {
            Some((PoolKind::Active, i)) => (&mut self.active, i),
            Some((PoolKind::Inactive, i)) => (&mut self.inactive, i),
            None => return Err(PoolError::UnknownModule { id: id.to_string() }),
        };
        let (modules, i) = pool;
        let module = modules.remove(i);
        modules.push(module);
        Ok(())
    }

    /// Replace the active pool with `ordered`, assigning 1-based load orders.
    ///
    /// `ordered` must hold exactly the modules in the active id set; the
    /// active pool itself may have been emptied by [`Pools::take_active`].
    pub(crate) fn commit_order(&mut self, ordered: Vec<Module>) {
        debug_assert_eq!(ordered.len(), self.active_ids.len());
        self.active = ordered
            .into_iter()
            .enumerate()
            .map(|(i, mut m)| {
                m.load_order = Some(i + 1);
                m
            })
            .collect();
    }

    /// Take the active modules out, leaving the active pool empty but the
    /// active id set intact. Pair with [`Pools::commit_order`].
    pub(crate) fn take_active(&mut self) -> Vec<Module> {
        std::mem::take(&mut self.active)
    }

    pub(crate) fn modules_mut(&mut self) -> (&mut [Module], &mut [Module]) {
        (&mut self.active, &mut self.inactive)
    }

    pub fn into_parts(self) -> (Vec<Module>, Vec<Module>) {
        (self.active, self.inactive)
    }
}
