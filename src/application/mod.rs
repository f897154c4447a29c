// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestration only: these modules wire the data, ml, and infra
// layers together for one goal each and contain no tensor math,
// no file-format knowledge, and no CLI types.

// The fine-tuning workflow
pub mod train_use_case;

// The spelling→pronunciation inference workflow
pub mod predict_use_case;
