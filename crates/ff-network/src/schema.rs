//! Row layouts of the per-network sheets, one struct per sheet.
//!
//! Column names follow the source workbooks exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusCoordRow {
    #[serde(rename = "Node_ID")]
    pub node_id: String,
    #[serde(rename = "NodeStartX", default)]
    pub x: Option<f64>,
    #[serde(rename = "NodeStartY", default)]
    pub y: Option<f64>,
}

/// MV conductor between two MV nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRow {
    #[serde(rename = "Element_Name", default)]
    pub element_name: String,
    #[serde(rename = "Line_Number")]
    pub line_number: String,
    #[serde(rename = "Start_Node")]
    pub start_node: String,
    #[serde(rename = "Start_Node_Phase")]
    pub start_node_phase: String,
    #[serde(rename = "End_Node")]
    pub end_node: String,
    #[serde(rename = "End_Node_Phase")]
    pub end_node_phase: String,
    #[serde(rename = "Phases")]
    pub phases: u8,
    #[serde(rename = "Length")]
    pub length: f64,
    #[serde(rename = "Units")]
    pub units: String,
    #[serde(rename = "Linecode")]
    pub linecode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinecodeRow {
    #[serde(rename = "Linecode_ID")]
    pub linecode_id: String,
    #[serde(rename = "Phases")]
    pub phases: u8,
    pub r1: f64,
    pub x1: f64,
    pub b1: f64,
    pub r0: f64,
    pub x0: f64,
    pub b0: f64,
    #[serde(rename = "Units")]
    pub units: String,
    #[serde(rename = "Ampacity1", default)]
    pub ampacity1: Option<f64>,
    #[serde(rename = "Ampacity2", default)]
    pub ampacity2: Option<f64>,
}

/// Substation transformer (`mv_net_txs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstationTxRow {
    #[serde(rename = "Substation_ID")]
    pub substation_id: String,
    #[serde(rename = "Bus1")]
    pub bus1: String,
    #[serde(rename = "Bus2")]
    pub bus2: String,
    #[serde(rename = "Connection_Primary")]
    pub connection_primary: String,
    #[serde(rename = "Connection_Secondary")]
    pub connection_secondary: String,
    pub kvs_primary: f64,
    pub kvs_secondary: f64,
    #[serde(default)]
    pub kvas_primary: Option<f64>,
    pub kvas_secondary: f64,
    pub loadloss: f64,
    pub noloadloss: f64,
    pub xhl: f64,
}

/// MV/MV transformer or voltage regulator (`mvtx`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MvTxRow {
    #[serde(rename = "Substation_ID")]
    pub substation_id: String,
    #[serde(rename = "Bus1")]
    pub bus1: String,
    #[serde(rename = "Bus2")]
    pub bus2: String,
    #[serde(rename = "Conn_Type", default)]
    pub conn_type: String,
    pub kvs_primary: f64,
    pub kvs_secondary: f64,
    #[serde(default)]
    pub kvas_primary: Option<f64>,
    pub kvas_secondary: f64,
    pub xhl: f64,
    pub noloadloss: f64,
    pub loadloss: f64,
    #[serde(default)]
    pub wdg1_numtaps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MvCapRow {
    #[serde(rename = "Element_ID")]
    pub element_id: String,
    #[serde(rename = "Bus1")]
    pub bus1: String,
    pub phases: u8,
    pub kvar: f64,
    pub kvs: f64,
}

/// MV/LV distribution transformer (`lvtx`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LvTxRow {
    #[serde(rename = "Substation_ID")]
    pub substation_id: String,
    #[serde(rename = "Bus1")]
    pub bus1: String,
    #[serde(rename = "Conn_Type")]
    pub conn_type: String,
    #[serde(rename = "Connection_Primary")]
    pub connection_primary: String,
    #[serde(rename = "Connection_Secondary")]
    pub connection_secondary: String,
    pub kvs_primary: f64,
    pub kvs_secondary: f64,
    #[serde(default)]
    pub kvas_primary: Option<f64>,
    pub kvas_secondary: f64,
    pub xhl: f64,
    pub noloadloss: f64,
    pub loadloss: f64,
    pub wdg1_tap: f64,
    #[serde(rename = "Type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LvLineRow {
    pub line_name: String,
    pub bus1: String,
    pub bus2: String,
    pub phases: u8,
    pub length: f64,
    pub units: String,
    pub linecode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LvLoadRow {
    pub load_name: String,
    pub bus1: String,
    pub phases: u8,
    pub kv: f64,
    pub pf: f64,
    /// Solver load status (`variable`, `fixed`, `exempt`).
    #[serde(rename = "model", default)]
    pub status: String,
    #[serde(default)]
    pub tx_cap: Option<f64>,
}

/// Co-located generation at a customer connection point (`lv_generation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRow {
    pub gen_name: String,
    pub bus1: String,
    pub phases: u8,
    pub kv: f64,
    pub kw: f64,
    #[serde(default = "unity_pf")]
    pub pf: f64,
}

fn unity_pf() -> f64 {
    1.0
}
