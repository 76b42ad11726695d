//! Snapshot export for operator reports.

use crate::types::PlantState;

/// Render the current snapshot as a two-line CSV report:
/// a fixed header and one data row with 2-decimal formatting.
pub fn snapshot_csv(state: &PlantState) -> String {
    let header = "Timestamp,BOD_Raw,BOD_Treated,TSS_Raw,TSS_Treated,DO,pH,Flow";
    let row = format!(
        "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
        state.timestamp.to_rfc3339(),
        state.stages.raw.bod,
        state.stages.treated.bod,
        state.stages.raw.tss,
        state.stages.treated.tss,
        state.sensors.dissolved_oxygen.value,
        state.sensors.ph.value,
        state.sensors.flow.value,
    );
    format!("{header}\n{row}\n")
}
