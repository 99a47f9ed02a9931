use miette::Result;

pub fn exec(expr: &str, active: &[String]) -> Result<()> {
    let value = modorder_ops::ops_condition::evaluate(expr, active)?;
    println!("{value}");
    Ok(())
}
