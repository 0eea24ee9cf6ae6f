use crate::run_service::RunMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingNetwork,
    LoadingProfiles,
    AssigningProfiles,
    BuildingCircuit,
    SolvingSnapshot,
    SolvingDaily,
    Aggregating,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingNetwork => "loading network",
            RunStage::LoadingProfiles => "loading profiles",
            RunStage::AssigningProfiles => "assigning profiles",
            RunStage::BuildingCircuit => "building circuit",
            RunStage::SolvingSnapshot => "solving snapshot",
            RunStage::SolvingDaily => "solving daily",
            RunStage::Aggregating => "aggregating",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DailyProgress {
    pub step: usize,
    pub steps: usize,
    pub fraction_complete: f64,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub mode: RunMode,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub daily: Option<DailyProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        mode: RunMode,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            mode,
            stage,
            elapsed_wall_s,
            message,
            daily: None,
        }
    }
}
