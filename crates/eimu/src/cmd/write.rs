use eimu_session::operations::{find, OperationKind};
use eimu_session::{round_to, Session, MOTION_DECIMALS};
use serde::Serialize;
use tracing::info;

use crate::cmd::WriteArgs;
use crate::exit::{session_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, print_kv_table, OutputFormat};

#[derive(Serialize)]
struct WriteOutput<'a> {
    vector: &'a str,
    command: &'a str,
    written: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    read_back: Option<[f32; 3]>,
}

pub fn run(args: WriteArgs, format: OutputFormat) -> CliResult<i32> {
    let op = find(&args.vector, OperationKind::WriteVector)
        .ok_or_else(|| CliError::new(USAGE, format!("unknown vector: {}", args.vector)))?;
    let values = [args.x, args.y, args.z];
    let mut session = args.connect.connect()?;

    session
        .execute(op, &values)
        .into_result()
        .map_err(|err| session_error("write failed", err))?;
    info!(vector = op.name, ?values, "vector written");

    let read_back = if args.verify {
        Some(verify(&mut session, &args.vector, values)?)
    } else {
        None
    };

    let out = WriteOutput {
        vector: op.name,
        command: op.command.name,
        written: values,
        read_back,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut rows = vec![
                ("vector", out.vector.to_string()),
                ("written", format!("{:?}", out.written)),
            ];
            if let Some(back) = out.read_back {
                rows.push(("read back", format!("{back:?}")));
            }
            print_kv_table(&rows);
        }
        OutputFormat::Pretty => println!("{} <- {:?}", out.vector, out.written),
        OutputFormat::Raw => {}
    }
    Ok(SUCCESS)
}

/// Read the vector back and require it to match what was written.
fn verify(session: &mut Session, name: &str, written: [f32; 3]) -> CliResult<[f32; 3]> {
    let op = find(name, OperationKind::Read)
        .ok_or_else(|| CliError::new(USAGE, format!("{name} cannot be read back")))?;
    let values = session
        .execute(op, &[])
        .into_result()
        .map_err(|err| session_error("read-back failed", err))?;
    let back = <[f32; 3]>::try_from(values.as_slice())
        .map_err(|_| CliError::new(DATA_INVALID, format!("{name} read back {} values", values.len())))?;

    let matches = written
        .iter()
        .zip(&back)
        .all(|(w, b)| round_to(*w, MOTION_DECIMALS) == *b);
    if !matches {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{name} read back {back:?}, wrote {written:?}"),
        ));
    }
    Ok(back)
}
