use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use eimu_session::operations::{find, OperationKind};
use eimu_session::Reading;
use tracing::warn;

use crate::cmd::{parse_duration, ReadArgs};
use crate::exit::{session_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_sample, print_samples, OutputFormat};

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let op = find(&args.quantity, OperationKind::Read)
        .ok_or_else(|| CliError::new(USAGE, format!("unknown quantity: {}", args.quantity)))?;
    let interval = parse_duration(&args.interval)?;
    let mut session = args.connect.connect()?;

    if args.count == 1 {
        let reading = session.execute(op, &[]);
        if reading.success() {
            print_sample(op, &reading, format);
            return Ok(SUCCESS);
        }
        return reading
            .into_result()
            .map(|_| SUCCESS)
            .map_err(|err| session_error("read failed", err));
    }

    let running = Arc::new(AtomicBool::new(true));
    if args.count == 0 {
        install_ctrlc_handler(running.clone())?;
    }

    // A finite table is printed once at the end; everything else streams.
    let batch_table = matches!(format, OutputFormat::Table) && args.count > 0;
    let mut batch: Vec<Reading<Vec<f32>>> = Vec::new();
    let mut taken = 0u64;
    let mut failures = 0u64;

    while running.load(Ordering::SeqCst) && (args.count == 0 || taken < args.count) {
        if taken > 0 && !interval.is_zero() {
            thread::sleep(interval);
        }
        let reading = session.execute(op, &[]);
        taken += 1;
        if let Some(err) = reading.error() {
            failures += 1;
            warn!(operation = op.name, sample = taken, error = %err, "read failed");
            if !err.is_recoverable() {
                break;
            }
        }
        if batch_table {
            batch.push(reading);
        } else {
            let stream_format = match format {
                OutputFormat::Table => OutputFormat::Pretty,
                other => other,
            };
            print_sample(op, &reading, stream_format);
        }
    }

    if batch_table {
        print_samples(op, &batch);
    }
    Ok(if failures == 0 { SUCCESS } else { FAILURE })
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
