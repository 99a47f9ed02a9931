pub mod ops_check;
pub mod ops_condition;
pub mod ops_edit;
pub mod ops_list;
pub mod ops_pool;
pub mod ops_resolve;

use modorder_core::module::Module;

/// Print every error and, if `show_warnings`, every warning recorded on
/// `modules` to stderr. Returns the number of errors printed.
pub fn print_diagnostics<'a>(
    modules: impl IntoIterator<Item = &'a Module>,
    show_warnings: bool,
) -> usize {
    let mut errors = 0;
    for module in modules {
        for message in &module.diagnostics.errors {
            modorder_util::progress::status_error("error", &format!("{module}: {message}"));
            errors += 1;
        }
        if show_warnings {
            for message in &module.diagnostics.warnings {
                modorder_util::progress::status_warn("warning", &format!("{module}: {message}"));
            }
        }
    }
    errors
}
