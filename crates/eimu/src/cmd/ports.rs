use eimu_transport::available_ports;
use serde::Serialize;

use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<&'a str>,
}

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let ports = available_ports().map_err(|err| transport_error("port scan failed", err))?;
    let out: Vec<PortOutput<'_>> = ports
        .iter()
        .map(|p| PortOutput {
            name: &p.name,
            kind: p.kind,
            product: p.product.as_deref(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = comfy_table::Table::new();
            table
                .load_preset(comfy_table::presets::UTF8_FULL)
                .set_header(vec!["PORT", "TYPE", "PRODUCT"]);
            for port in &out {
                table.add_row(vec![port.name, port.kind, port.product.unwrap_or("-")]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for port in &out {
                println!("{}", port.name);
            }
        }
    }
    Ok(SUCCESS)
}
