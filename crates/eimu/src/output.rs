use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use eimu_session::{Operation, Reading};
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Labeled reply values, serialized as an ordered map.
struct Fields<'a> {
    names: &'static [&'static str],
    values: &'a [f32],
}

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.names.iter().zip(self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct SampleOutput<'a> {
    operation: &'static str,
    command: &'static str,
    success: bool,
    values: Fields<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> SampleOutput<'a> {
    fn new(op: &Operation, reading: &'a Reading<Vec<f32>>) -> Self {
        Self {
            operation: op.name,
            command: op.command.name,
            success: reading.success(),
            values: Fields {
                names: op.fields,
                values: reading.value(),
            },
            error: reading.error().map(ToString::to_string),
        }
    }
}

/// Print one reading as soon as it arrives.
pub fn print_sample(op: &Operation, reading: &Reading<Vec<f32>>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SampleOutput::new(op, reading)),
        OutputFormat::Table => print_samples(op, std::slice::from_ref(reading)),
        OutputFormat::Pretty => {
            let values = op
                .fields
                .iter()
                .zip(reading.value())
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            match reading.error() {
                None => println!("{} {values}", op.name),
                Some(err) => println!("{} failed: {err}", op.name),
            }
        }
        OutputFormat::Raw => print_raw_values(reading.value()),
    }
}

/// Print a batch of readings of the same operation as one table.
pub fn print_samples(op: &Operation, readings: &[Reading<Vec<f32>>]) {
    let mut header = vec!["#".to_string()];
    header.extend(op.fields.iter().map(|name| name.to_uppercase()));
    header.push("STATUS".to_string());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for (i, reading) in readings.iter().enumerate() {
        let mut row = vec![(i + 1).to_string()];
        row.extend(reading.value().iter().map(ToString::to_string));
        row.push(match reading.error() {
            None => "ok".to_string(),
            Some(err) => err.to_string(),
        });
        table.add_row(row);
    }
    println!("{table}");
}

/// Space-separated values on one line.
pub fn print_raw_values(values: &[f32]) {
    let line = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Two-column key/value table.
pub fn print_kv_table(rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FIELD", "VALUE"]);
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value.clone()]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use eimu_session::operations::{find, OperationKind};
    use eimu_session::SessionError;

    use super::*;

    #[test]
    fn sample_json_keeps_field_order() {
        let op = find("rpy", OperationKind::Read).unwrap();
        let reading = Reading::from_result(Ok(vec![0.5, -0.25, 1.0]));
        let json = serde_json::to_string(&SampleOutput::new(op, &reading)).unwrap();
        assert_eq!(
            json,
            r#"{"operation":"rpy","command":"READ_RPY","success":true,"values":{"roll":0.5,"pitch":-0.25,"yaw":1.0}}"#
        );
    }

    #[test]
    fn failed_sample_carries_error() {
        let op = find("acc", OperationKind::Read).unwrap();
        let reading = Reading::from_result(Err::<Vec<f32>, _>(SessionError::NotConnected))
            .map(|_| vec![0.0; 3]);
        let value = serde_json::to_value(SampleOutput::new(op, &reading)).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "no open session");
        assert_eq!(value["values"]["z"], 0.0);
    }
}
