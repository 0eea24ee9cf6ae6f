//! Explicit handles for solver elements and buses.

use core::fmt;

use ff_network::{Generator, Line, Load, NetworkModel, Transformer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementClass {
    Circuit,
    Vsource,
    Transformer,
    Linecode,
    Line,
    Capacitor,
    Reactor,
    RegControl,
    Loadshape,
    Load,
    Generator,
}

impl ElementClass {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Circuit => "Circuit",
            Self::Vsource => "Vsource",
            Self::Transformer => "Transformer",
            Self::Linecode => "Linecode",
            Self::Line => "Line",
            Self::Capacitor => "Capacitor",
            Self::Reactor => "Reactor",
            Self::RegControl => "RegControl",
            Self::Loadshape => "Loadshape",
            Self::Load => "Load",
            Self::Generator => "Generator",
        }
    }
}

/// `Class.name`, the way every element query addresses its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub class: ElementClass,
    pub name: String,
}

impl ElementRef {
    pub fn new(class: ElementClass, name: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
        }
    }

    pub fn line(line: &Line) -> Self {
        Self::new(ElementClass::Line, &line.name)
    }

    pub fn transformer(transformer: &Transformer) -> Self {
        Self::new(ElementClass::Transformer, &transformer.name)
    }

    pub fn load(load: &Load) -> Self {
        Self::new(ElementClass::Load, &load.name)
    }

    pub fn generator(generator: &Generator) -> Self {
        Self::new(ElementClass::Generator, &generator.name)
    }

    /// Case-insensitive identity, as the solver treats names.
    pub fn key(&self) -> String {
        format!("{}.{}", self.class.keyword(), self.name).to_ascii_lowercase()
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class.keyword(), self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusRef(pub String);

impl BusRef {
    pub fn of(model: &NetworkModel, bus: ff_core::BusId) -> Self {
        Self(model.bus_name(bus).to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
