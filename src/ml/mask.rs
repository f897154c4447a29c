// ============================================================
// Layer 5 — Attention Mask Builders
// ============================================================
// Boolean masks restricting which key positions a query position
// may attend to. Convention throughout: true = masked (may NOT
// attend), matching burn's MhaInput.
//
// Two kinds are built here:
//   padding mask    — true where the key token is [PAD]
//   look-ahead mask — true where the key index is in the future
//
// Decoder self-attention uses their logical OR: a query may only
// see key positions that are both non-future and non-padding.

use burn::prelude::*;

/// Key-padding mask over a token-id batch.
///
/// `token_ids`: [batch, key_len] → mask: [batch, key_len],
/// true exactly where the id equals `pad_id`.
pub fn padding_key_mask<B: Backend>(
    token_ids: &Tensor<B, 2, Int>,
    pad_id:    usize,
) -> Tensor<B, 2, Bool> {
    token_ids.clone().equal_elem(pad_id as i32)
}

/// Padding mask in broadcast form for attention scores.
///
/// `token_ids`: [batch, key_len] → mask: [batch, query_len, key_len].
/// The key axis carries the pad information; the query axis is a
/// pure broadcast — every query is blocked from padded keys.
pub fn padding_attn_mask<B: Backend>(
    token_ids: &Tensor<B, 2, Int>,
    pad_id:    usize,
    query_len: usize,
) -> Tensor<B, 3, Bool> {
    let [batch, key_len] = token_ids.dims();
    padding_key_mask(token_ids, pad_id)
        .unsqueeze_dim::<3>(1)
        .expand([batch, query_len, key_len])
}

/// Look-ahead (causal) mask.
///
/// Returns [seq_len, seq_len], true iff key index > query index.
/// A pure function of length — token content never matters.
pub fn look_ahead_mask<B: Backend>(
    seq_len: usize,
    device:  &B::Device,
) -> Tensor<B, 2, Bool> {
    Tensor::<B, 2>::ones([seq_len, seq_len], device)
        .triu(1)
        .greater_elem(0.5)
}

/// Fused decoder self-attention mask: look-ahead OR padding.
///
/// `decoder_ids`: [batch, seq_len] → mask: [batch, seq_len, seq_len],
/// true at (i, j) iff j > i or key j is padding.
///
/// The OR is computed as int add + greater-than-zero, which stays
/// on-device for every backend.
pub fn decoder_self_attn_mask<B: Backend>(
    decoder_ids: &Tensor<B, 2, Int>,
    pad_id:      usize,
) -> Tensor<B, 3, Bool> {
    let [batch, seq_len] = decoder_ids.dims();
    let device = decoder_ids.device();

    let pad    = padding_attn_mask(decoder_ids, pad_id, seq_len);
    let causal = look_ahead_mask::<B>(seq_len, &device)
        .unsqueeze_dim::<3>(0)
        .expand([batch, seq_len, seq_len]);

    (pad.int() + causal.int()).greater_elem(0)
}
