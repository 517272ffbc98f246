use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;
use serde_json::Value;

use crate::sensor::{Reading, Sensor, State};

#[must_use]
pub fn build_readings_table(readings: &[(Sensor, Reading)]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Sensor", "Object ID", "State", "Unit", "Attributes"]);
    for (sensor, reading) in readings {
        let state = match &reading.state {
            None => Cell::new("unknown").add_attribute(Attribute::Dim),
            Some(state @ State::Money(pounds)) => Cell::new(state).fg(
                if pounds.amount().is_sign_negative() { Color::Red } else { Color::Green },
            ),
            Some(state @ State::Text(_)) => Cell::new(state),
            Some(state) => Cell::new(state).set_alignment(CellAlignment::Right),
        };
        table.add_row(vec![
            Cell::new(sensor),
            Cell::new(sensor.object_id()).add_attribute(Attribute::Dim),
            state,
            Cell::new(sensor.unit().unwrap_or_default()),
            Cell::new(summarize(reading)).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

/// One line per attribute, nested values collapsed to their size.
fn summarize(reading: &Reading) -> String {
    reading
        .attributes
        .iter()
        .map(|(key, value)| match value {
            Value::Array(items) => format!("{key}: [{} items]", items.len()),
            Value::Object(entries) => format!("{key}: {{{} entries}}", entries.len()),
            Value::String(text) => format!("{key}: {text}"),
            other => format!("{key}: {other}"),
        })
        .join("\n")
}
