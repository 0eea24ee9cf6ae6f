//! Solver commands and the build stages they belong to.

use core::fmt;

use crate::element::{ElementClass, ElementRef};

/// Build stages in the order they must be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Preamble,
    Source,
    SubstationTransformer,
    Linecodes,
    MvLines,
    Capacitors,
    MvTransformers,
    LvTransformers,
    LvLines,
    Loads,
    Generation,
    Settings,
}

impl Stage {
    pub const ALL: [Stage; 12] = [
        Stage::Preamble,
        Stage::Source,
        Stage::SubstationTransformer,
        Stage::Linecodes,
        Stage::MvLines,
        Stage::Capacitors,
        Stage::MvTransformers,
        Stage::LvTransformers,
        Stage::LvLines,
        Stage::Loads,
        Stage::Generation,
        Stage::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Preamble => "preamble",
            Stage::Source => "source",
            Stage::SubstationTransformer => "substation transformer",
            Stage::Linecodes => "linecodes",
            Stage::MvLines => "MV lines",
            Stage::Capacitors => "capacitors",
            Stage::MvTransformers => "MV transformers",
            Stage::LvTransformers => "LV transformers",
            Stage::LvLines => "LV lines",
            Stage::Loads => "loads",
            Stage::Generation => "generation",
            Stage::Settings => "settings",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub type Properties = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear,
    Set(Properties),
    New {
        element: ElementRef,
        properties: Properties,
    },
    /// Property edit on an explicitly named element.
    Edit {
        element: ElementRef,
        properties: Properties,
    },
    CalcVoltageBases,
}

impl Command {
    pub fn set(key: &str, value: impl fmt::Display) -> Self {
        Command::Set(vec![(key.to_string(), value.to_string())])
    }

    pub fn define(class: ElementClass, name: impl Into<String>) -> Self {
        Command::New {
            element: ElementRef::new(class, name),
            properties: Vec::new(),
        }
    }

    pub fn edit(class: ElementClass, name: impl Into<String>) -> Self {
        Command::Edit {
            element: ElementRef::new(class, name),
            properties: Vec::new(),
        }
    }

    /// Append a property; no-op on commands without properties.
    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        match &mut self {
            Command::Set(properties)
            | Command::New { properties, .. }
            | Command::Edit { properties, .. } => {
                properties.push((key.to_string(), value.to_string()));
            }
            Command::Clear | Command::CalcVoltageBases => {}
        }
        self
    }

    pub fn with_opt(self, key: &str, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// The element this command brings into existence.
    pub fn defines(&self) -> Option<&ElementRef> {
        match self {
            Command::New { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        let properties = match self {
            Command::Set(p)
            | Command::New { properties: p, .. }
            | Command::Edit { properties: p, .. } => p,
            Command::Clear | Command::CalcVoltageBases => return None,
        };
        properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

fn write_properties(f: &mut fmt::Formatter<'_>, properties: &Properties) -> fmt::Result {
    for (key, value) in properties {
        write!(f, " {key}={value}")?;
    }
    Ok(())
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Clear => f.write_str("Clear"),
            Command::Set(properties) => {
                f.write_str("Set")?;
                write_properties(f, properties)
            }
            Command::New {
                element,
                properties,
            } => {
                write!(f, "New {element}")?;
                write_properties(f, properties)
            }
            Command::Edit {
                element,
                properties,
            } => {
                write!(f, "Edit {element}")?;
                write_properties(f, properties)
            }
            Command::CalcVoltageBases => f.write_str("CalcVoltageBases"),
        }
    }
}

/// `[a, b, c]`
pub fn list<T: fmt::Display>(items: &[T]) -> String {
    let inner = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}
