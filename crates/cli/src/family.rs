//! Sample model replayed by `docstore demo`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition key path of the family container
pub const FAMILY_PARTITION_KEY_PATH: &str = "/lastName";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub last_name: String,
    pub parents: Vec<Parent>,
    pub children: Vec<Child>,
    pub address: Address,
    pub is_registered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub first_name: String,
    pub gender: String,
    pub age: u32,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub given_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub zipcode: String,
    pub city: String,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "[{},{}]", self.last_name, self.id),
        }
    }
}

fn pet(name: &str) -> Pet {
    Pet {
        given_name: name.to_string(),
    }
}

fn parent(family_name: Option<&str>, first_name: &str) -> Parent {
    Parent {
        family_name: family_name.map(str::to_string),
        first_name: first_name.to_string(),
    }
}

pub fn van_appeldoorn() -> Family {
    Family {
        id: "Appeldoorn.1".to_string(),
        last_name: "van Appeldoorn".to_string(),
        parents: vec![parent(None, "Bertus"), parent(None, "Mien")],
        children: vec![Child {
            family_name: None,
            first_name: "Erikson Salvador".to_string(),
            gender: "Male".to_string(),
            age: 17,
            pets: vec![pet("Nacho"), pet("Ricito")],
        }],
        address: Address {
            street: "Ter Maatenlaan 23".to_string(),
            zipcode: "3931 WE".to_string(),
            city: "Woudenberg".to_string(),
        },
        is_registered: false,
    }
}

pub fn wakefield() -> Family {
    Family {
        id: "Wakefield.7".to_string(),
        last_name: "Wakefield".to_string(),
        parents: vec![
            parent(Some("Wakefield"), "Robin"),
            parent(Some("Miller"), "Ben"),
        ],
        children: vec![
            Child {
                family_name: Some("Merriam".to_string()),
                first_name: "Jesse".to_string(),
                gender: "female".to_string(),
                age: 8,
                pets: vec![pet("Goofy"), pet("Shadow")],
            },
            Child {
                family_name: Some("Miller".to_string()),
                first_name: "Lisa".to_string(),
                gender: "female".to_string(),
                age: 1,
                pets: Vec::new(),
            },
        ],
        address: Address {
            street: "Europe boulevard 67".to_string(),
            zipcode: "1010AB".to_string(),
            city: "New York".to_string(),
        },
        is_registered: true,
    }
}
