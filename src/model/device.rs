use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Per-device variables as returned by the gateway, in API order.
pub type Variables = Map<String, Value>;

const UNKNOWN_DEVICE: &str = "unknown";

/// A device entry from `GET /devices`.
///
/// Only JSON objects decode. `name` and `variables` fall back to `"unknown"`
/// and an empty map when absent; when present they must be a string and an
/// object, `null` included.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub name: String,
    pub variables: Variables,
}

impl Device {
    /// The `ansible_host` variable, whatever its JSON type.
    pub fn ansible_host(&self) -> Option<&Value> {
        self.variables.get("ansible_host")
    }
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = object::<D::Error>(Value::deserialize(deserializer)?, "a device object")?;

        let name = match fields.remove("name") {
            None => UNKNOWN_DEVICE.to_string(),
            Some(Value::String(name)) => name,
            Some(other) => return Err(invalid::<D::Error>(&other, "a device name string")),
        };
        let variables = match fields.remove("variables") {
            None => Variables::new(),
            Some(other) => object::<D::Error>(other, "a variables object")?,
        };

        Ok(Self { name, variables })
    }
}

/// Body of `POST /login`.
#[derive(Debug)]
pub struct LoginResponse {
    pub token: Option<Value>,
}

impl LoginResponse {
    /// The token, if present as a non-empty string.
    pub fn into_token(self) -> Option<String> {
        match self.token {
            Some(Value::String(token)) if !token.is_empty() => Some(token),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LoginResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = object::<D::Error>(Value::deserialize(deserializer)?, "a login object")?;
        Ok(Self {
            token: fields.remove("token"),
        })
    }
}

/// Body of `GET /devices`. A missing `data` field means no devices.
#[derive(Debug)]
pub struct DevicesResponse {
    pub data: Vec<Device>,
}

impl<'de> Deserialize<'de> for DevicesResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = object::<D::Error>(Value::deserialize(deserializer)?, "a devices object")?;

        let data = match fields.remove("data") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| Device::deserialize(item).map_err(<D::Error as de::Error>::custom))
                .collect::<Result<_, D::Error>>()?,
            Some(other) => return Err(invalid::<D::Error>(&other, "a list of devices")),
        };

        Ok(Self { data })
    }
}

fn object<E: de::Error>(value: Value, expected: &'static str) -> Result<Map<String, Value>, E> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(invalid(&other, expected)),
    }
}

fn invalid<E: de::Error>(value: &Value, expected: &'static str) -> E {
    let unexpected = match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    };
    E::invalid_type(unexpected, &expected)
}
