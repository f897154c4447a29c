// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types and traits that define what the system works
// with. Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain structs, enums, and traits
// Keeping it pure means everything here unit-tests without a GPU
// and the abstractions can be swapped without touching the rest
// of the tree.

// A spelling/pronunciation sentence pair
pub mod pair;

// Core abstractions (traits) that other layers implement
pub mod traits;
