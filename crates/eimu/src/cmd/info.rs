use eimu_session::{Reading, Session};
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{CliResult, FAILURE, SUCCESS};
use crate::output::{print_json, print_kv_table, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    port: String,
    wire: &'static str,
    connected: bool,
    frame_id: Option<u8>,
    i2c_address: Option<u8>,
    filter_gain: Option<f32>,
    acc_cutoff_hz: Option<f32>,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.connect.connect()?;
    let out = collect(&mut session);
    session.disconnect();

    let complete = out.frame_id.is_some()
        && out.i2c_address.is_some()
        && out.filter_gain.is_some()
        && out.acc_cutoff_hz.is_some();
    print_info(&out, format);
    Ok(if complete { SUCCESS } else { FAILURE })
}

fn collect(session: &mut Session) -> InfoOutput {
    InfoOutput {
        port: session.port().to_string(),
        wire: session.wire_format().codec().name(),
        connected: session.is_connected(),
        frame_id: ok(session.get_world_frame_id()),
        i2c_address: ok(session.get_i2c_address()),
        filter_gain: ok(session.get_filter_gain()),
        acc_cutoff_hz: ok(session.get_acc_filter_cutoff()),
    }
}

fn ok<T>(reading: Reading<T>) -> Option<T> {
    reading.into_result().ok()
}

fn show<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "unavailable".to_string(), |v| v.to_string())
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_kv_table(&[
            ("port", out.port.clone()),
            ("wire", out.wire.to_string()),
            ("frame id", show(out.frame_id)),
            ("i2c address", show(out.i2c_address.map(|a| format!("0x{a:02X}")))),
            ("filter gain", show(out.filter_gain)),
            ("acc cutoff (Hz)", show(out.acc_cutoff_hz)),
        ]),
        OutputFormat::Pretty => {
            println!("Device Info:");
            println!("  Port:             {}", out.port);
            println!("  Wire:             {}", out.wire);
            println!("  World frame id:   {}", show(out.frame_id));
            println!(
                "  I2C address:      {}",
                show(out.i2c_address.map(|a| format!("0x{a:02X}")))
            );
            println!("  Filter gain:      {}", show(out.filter_gain));
            println!("  Acc cutoff (Hz):  {}", show(out.acc_cutoff_hz));
        }
        OutputFormat::Raw => println!("{}", show(out.frame_id)),
    }
}
