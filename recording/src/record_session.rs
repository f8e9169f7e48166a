use crate::{data::InteractionRecord, error::Error, record_codec::RecordCodec};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const ENTRIES: &str = "Entries";
const VARIABLES: &str = "Variables";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSession {
    pub entries: Vec<InteractionRecord>,
    pub variables: BTreeMap<String, String>,
}

impl RecordSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: InteractionRecord) {
        self.entries.push(entry);
    }

    pub fn encode(&self, codec: &RecordCodec) -> Result<Value, Error> {
        let entries = self
            .entries
            .iter()
            .map(|entry| codec.encode(entry))
            .collect::<Result<Vec<_>, _>>()?;
        let variables = self
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect::<Map<_, _>>();

        let mut object = Map::new();
        object.insert(ENTRIES.into(), Value::Array(entries));
        object.insert(VARIABLES.into(), Value::Object(variables));
        Ok(Value::Object(object))
    }

    pub fn decode(node: &Value, codec: &RecordCodec) -> Result<Self, Error> {
        let object = node
            .as_object()
            .ok_or_else(|| Error::InvalidSessionFormat("expected an object".into()))?;
        let mut session = Self::new();

        if let Some(entries) = object.get(ENTRIES) {
            let entries = entries.as_array().ok_or_else(|| {
                Error::InvalidSessionFormat(format!("{} must be an array", ENTRIES))
            })?;
            for entry in entries {
                session.record(codec.decode(entry)?);
            }
        }

        if let Some(variables) = object.get(VARIABLES) {
            let variables = variables.as_object().ok_or_else(|| {
                Error::InvalidSessionFormat(format!("{} must be an object", VARIABLES))
            })?;
            for (name, value) in variables {
                let value = value.as_str().ok_or_else(|| {
                    Error::InvalidSessionFormat(format!("variable {} is not a string", name))
                })?;
                session.variables.insert(name.clone(), value.to_string());
            }
        }

        Ok(session)
    }

    pub fn to_vec(&self, codec: &RecordCodec) -> Result<Vec<u8>, Error> {
        codec.write(&self.encode(codec)?)
    }

    pub fn from_slice(bytes: &[u8], codec: &RecordCodec) -> Result<Self, Error> {
        let node: Value = serde_json::from_slice(bytes)?;
        Self::decode(&node, codec)
    }
}
