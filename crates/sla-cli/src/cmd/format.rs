use crate::output::print_json;
use sla_core::sla::format_duration;

pub fn run(hours: f64, json: bool) -> anyhow::Result<()> {
    let formatted = format_duration(hours);
    if json {
        return print_json(&serde_json::json!({
            "hours": hours,
            "formatted": formatted,
        }));
    }
    println!("{formatted}");
    Ok(())
}
