use eimu_session::operations::{find, OperationKind};

use crate::cmd::ActionArgs;
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_json, OutputFormat};

pub fn run(name: &str, args: ActionArgs, format: OutputFormat) -> CliResult<i32> {
    let op = find(name, OperationKind::Action)
        .ok_or_else(|| CliError::new(INTERNAL, format!("no action named {name}")))?;
    let mut session = args.connect.connect()?;
    session
        .execute(op, &[])
        .into_result()
        .map_err(|err| session_error(&format!("{name} failed"), err))?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "action": op.name,
            "command": op.command.name,
            "acknowledged": true,
        })),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{} acknowledged", op.command.name)
        }
        OutputFormat::Raw => println!("1"),
    }
    Ok(SUCCESS)
}
