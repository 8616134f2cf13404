use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Transaction category. The model is asked to pick one of the known
/// categories, but free-form answers are kept as `Other` rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Education,
    Income,
    Uncategorized,
    Other(String),
}

impl Category {
    pub const KNOWN: &'static [&'static str] = &[
        "food",
        "transport",
        "shopping",
        "bills",
        "entertainment",
        "health",
        "education",
        "income",
        "uncategorized",
    ];

    /// Normalize a raw category string, mapping common Indonesian aliases
    /// onto the known set. Unknown values are lowercased with spaces turned
    /// into underscores; empty input falls back to `Uncategorized`.
    pub fn normalize(raw: &str) -> Category {
        let cat = raw.trim().to_lowercase();
        if cat.is_empty() {
            return Category::Uncategorized;
        }
        match cat.as_str() {
            "food" | "makan" | "makanan" => Category::Food,
            "transport" | "transportasi" => Category::Transport,
            "shopping" | "belanja" => Category::Shopping,
            "bills" | "bayar" | "tagihan" => Category::Bills,
            "entertainment" | "hiburan" => Category::Entertainment,
            "health" | "kesehatan" => Category::Health,
            "education" | "pendidikan" => Category::Education,
            "income" | "gaji" => Category::Income,
            "uncategorized" => Category::Uncategorized,
            other => Category::Other(other.replace(' ', "_")),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Bills => "bills",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Education => "education",
            Category::Income => "income",
            Category::Uncategorized => "uncategorized",
            Category::Other(s) => s,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Category::normalize(&s))
    }
}
