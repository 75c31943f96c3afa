use eimu_frame::{Access, RequestShape};
use eimu_session::operations::{OperationKind, OPERATIONS};
use serde::Serialize;

use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct CommandOutput {
    name: &'static str,
    kind: &'static str,
    opcode: String,
    command: &'static str,
    topic: &'static str,
    request_bytes: usize,
    reply_floats: usize,
}

fn kind_name(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Read => "read",
        OperationKind::Get => "get",
        OperationKind::Set => "set",
        OperationKind::Action => "action",
        OperationKind::WriteVector => "write",
    }
}

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let rows: Vec<CommandOutput> = OPERATIONS
        .iter()
        .map(|op| CommandOutput {
            name: op.name,
            kind: kind_name(op.kind()),
            opcode: format!("0x{:02X}", op.command.opcode),
            command: op.command.name,
            topic: op.command.topic,
            request_bytes: op.command.shape.payload_len(),
            reply_floats: op.command.reply_arity,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = comfy_table::Table::new();
            table
                .load_preset(comfy_table::presets::UTF8_FULL)
                .set_header(vec!["NAME", "KIND", "OPCODE", "COMMAND", "TOPIC", "REQ", "REPLY"]);
            for row in &rows {
                table.add_row(vec![
                    row.name.to_string(),
                    row.kind.to_string(),
                    row.opcode.clone(),
                    row.command.to_string(),
                    row.topic.to_string(),
                    row.request_bytes.to_string(),
                    row.reply_floats.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for op in OPERATIONS {
                let access = match (op.command.access, op.command.shape) {
                    (Access::Write, RequestShape::Vector) => "w",
                    (Access::Write, _) | (Access::Action, _) => "x",
                    (Access::Read, _) => "r",
                };
                println!("{access} {:<12} {}", op.name, op.command);
            }
        }
    }
    Ok(SUCCESS)
}
