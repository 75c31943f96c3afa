use eimu_session::operations::{find, Operation, OperationKind};
use eimu_session::Session;
use serde::Serialize;

use crate::cmd::{GetArgs, SetArgs};
use crate::exit::{session_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, print_kv_table, OutputFormat};

#[derive(Serialize)]
struct ParamOutput<'a> {
    param: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored: Option<bool>,
}

fn lookup(name: &str, kind: OperationKind) -> CliResult<&'static Operation> {
    find(name, kind).ok_or_else(|| CliError::new(USAGE, format!("unknown parameter: {name}")))
}

pub fn get(args: GetArgs, format: OutputFormat) -> CliResult<i32> {
    let op = lookup(&args.param, OperationKind::Get)?;
    let mut session = args.connect.connect()?;
    let value = get_value(&mut session, op)?;
    print_param(
        &ParamOutput {
            param: op.name,
            value: Some(value),
            stored: None,
        },
        format,
    );
    Ok(SUCCESS)
}

pub fn set(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    let op = lookup(&args.param, OperationKind::Set)?;
    let mut session = args.connect.connect()?;
    session
        .execute(op, &[args.value])
        .into_result()
        .map_err(|err| session_error("set failed", err))?;
    print_param(
        &ParamOutput {
            param: op.name,
            value: Some(args.value),
            stored: Some(true),
        },
        format,
    );
    Ok(SUCCESS)
}

fn get_value(session: &mut Session, op: &Operation) -> CliResult<f32> {
    let values = session
        .execute(op, &[])
        .into_result()
        .map_err(|err| session_error("get failed", err))?;
    values
        .first()
        .copied()
        .ok_or_else(|| CliError::new(DATA_INVALID, format!("{} returned no value", op.name)))
}

fn print_param(out: &ParamOutput<'_>, format: OutputFormat) {
    let value = out.value.map(|v| v.to_string()).unwrap_or_default();
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut rows = vec![("param", out.param.to_string()), ("value", value)];
            if let Some(stored) = out.stored {
                rows.push(("stored", stored.to_string()));
            }
            print_kv_table(&rows);
        }
        OutputFormat::Pretty => match out.stored {
            Some(true) => println!("{} set to {value}", out.param),
            _ => println!("{} = {value}", out.param),
        },
        OutputFormat::Raw => println!("{value}"),
    }
}
