use serde::Serialize;
use serde_json::Value;

use crate::{
    api::utilita::models::{array, node, plain_text},
    prelude::*,
    sensor::{Attributes, State, to_attributes},
};

#[derive(Serialize)]
struct AccountAttributes<'a> {
    address: &'a Value,

    /// The portal formats it with thousands separators.
    premises_id: String,
}

pub fn state(user_data: &Value) -> Result<Option<State>> {
    Ok(plain_text(node(user_data, "/customer_id")?).map(State::Text))
}

pub fn attributes(user_data: &Value) -> Result<Attributes> {
    ensure!(user_data.is_object(), "the user data is not an object");
    let premises: &[Value] = match user_data.get("premises") {
        None | Some(Value::Null) => &[],
        Some(_) => array(user_data, "/premises")?,
    };
    let Some(premises) = premises.first() else {
        warn!("No premises found in the user data");
        return Ok(Attributes::new());
    };
    to_attributes(&AccountAttributes {
        address: premises.get("addr_full").unwrap_or(&Value::Null),
        premises_id: premises
            .get("premises_id")
            .and_then(plain_text)
            .unwrap_or_default()
            .replace(',', ""),
    })
}
