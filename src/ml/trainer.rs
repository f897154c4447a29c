// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Backend split:
//   - training runs on Autodiff<Wgpu> for gradients
//   - model.valid() strips autodiff for the validation pass
//
// Per epoch: average weighted cross-entropy on train and
// validation sets, token accuracy over non-pad target positions,
// metrics row to CSV, checkpoint to disk. A non-finite loss
// aborts the run immediately — there is nothing useful to
// checkpoint from a diverged model.

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::G2pBatcher, dataset::G2pDataset};
use crate::error::G2pError;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::loss::{class_weights, WeightedCrossEntropy};
use crate::ml::model::{Spell2PronConfig, Spell2PronModel};

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

/// Translate the run configuration into the model architecture record.
pub fn model_config(cfg: &TrainConfig) -> Spell2PronConfig {
    Spell2PronConfig::new(cfg.src_vocab_size, cfg.trg_vocab_size)
        .with_hidden_size(cfg.hidden_size)
        .with_num_attn_head(cfg.num_attn_head)
        .with_feed_forward_size(cfg.feed_forward_size)
        .with_max_seq_length(cfg.max_seq_length)
        .with_num_layers(cfg.num_layers)
        .with_dropout(cfg.dropout)
        .with_share_embeddings(cfg.share_embeddings)
        .with_pad_id(cfg.pad_id)
}

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: G2pDataset,
    val_dataset:   G2pDataset,
    ckpt_manager:  CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    train_dataset: G2pDataset,
    val_dataset:   G2pDataset,
    ckpt_manager:  CheckpointManager,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<()> {
    // ── Build model (fails fast on inconsistent hyperparameters) ─────────────
    let mut model: Spell2PronModel<MyBackend> = model_config(cfg).init(&device)?;
    tracing::info!(
        "Model ready: {} layers, hidden_size={}, {} heads",
        cfg.num_layers, cfg.hidden_size, cfg.num_attn_head,
    );

    // ── Class-weighted criterion, one per backend ─────────────────────────────
    let weights = class_weights(cfg.trg_vocab_size);
    let criterion = WeightedCrossEntropy::<MyBackend>::new(
        weights.clone(), cfg.pad_id, cfg.mask_pad_in_loss, &device,
    );
    let val_criterion = WeightedCrossEntropy::<MyInnerBackend>::new(
        weights, cfg.pad_id, cfg.mask_pad_in_loss, &device,
    );

    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_batcher = G2pBatcher::<MyBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(train_dataset);

    let val_batcher = G2pBatcher::<MyInnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let metrics = MetricsLogger::new(&*cfg.checkpoint_dir)?;
    let mut best_val_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(
                batch.encoder_ids,
                batch.decoder_ids,
                batch.targets,
                &criterion,
            );

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                return Err(G2pError::RuntimeCompute(format!(
                    "non-finite loss at epoch {epoch}, batch {train_batches}"
                ))
                .into());
            }
            train_loss_sum += loss_val;
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase (autodiff stripped, dropout off) ─────────────────
        let model_valid = model.valid();

        let mut val_loss_sum   = 0.0f64;
        let mut val_batches    = 0usize;
        let mut correct_tokens = 0usize;
        let mut total_tokens   = 0usize;

        for batch in val_loader.iter() {
            let (loss, logits) = model_valid.forward_loss(
                batch.encoder_ids,
                batch.decoder_ids,
                batch.targets.clone(),
                &val_criterion,
            );
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            // Token accuracy over non-pad target positions.
            let [batch_size, seq_len, _] = logits.dims();
            let preds = logits
                .argmax(2)
                .reshape([batch_size * seq_len]);
            let targets = batch.targets.reshape([batch_size * seq_len]);

            let non_pad = targets.clone().not_equal_elem(cfg.pad_id as i32);
            let hit     = preds.equal(targets);

            correct_tokens += (hit.int() * non_pad.clone().int())
                .sum()
                .into_scalar()
                .elem::<i64>() as usize;
            total_tokens += non_pad.int().sum().into_scalar().elem::<i64>() as usize;
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let token_acc    = if total_tokens > 0 {
            correct_tokens as f64 / total_tokens as f64
        } else {
            0.0
        };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | token_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, token_acc * 100.0,
        );

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, token_acc);
        if row.is_improvement(best_val_loss) {
            best_val_loss = row.val_loss;
            tracing::info!("New best validation loss: {:.4}", best_val_loss);
        }
        metrics.log(&row)?;
        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete");
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    // End-to-end: the trivial identity pair "가"/"가" through one
    // optimisation step must produce a finite loss and move the weights.
    #[test]
    fn one_training_step_on_identity_pair() {
        let device = Default::default();
        let cfg = Spell2PronConfig::new(30, 30)
            .with_hidden_size(16)
            .with_num_attn_head(2)
            .with_feed_forward_size(32)
            .with_max_seq_length(8)
            .with_num_layers(1)
            .with_dropout(0.0);
        let model = cfg.init::<TestBackend>(&device).unwrap();

        // ids: [PAD]=0, [CLS]=2, [SEP]=3, "가"=5
        let enc = Tensor::<TestBackend, 1, Int>::from_ints([5, 0, 0, 0, 0, 0, 0, 0], &device)
            .reshape([1, 8]);
        let dec = Tensor::<TestBackend, 1, Int>::from_ints([2, 5, 0, 0, 0, 0, 0, 0], &device)
            .reshape([1, 8]);
        let trg = Tensor::<TestBackend, 1, Int>::from_ints([5, 3, 0, 0, 0, 0, 0, 0], &device)
            .reshape([1, 8]);

        let criterion =
            WeightedCrossEntropy::<TestBackend>::new(class_weights(30), 0, false, &device);

        let before: Vec<f32> = model
            .projection
            .weight
            .val()
            .into_data()
            .to_vec()
            .unwrap();

        let (loss, logits) = model.forward_loss(enc, dec, trg, &criterion);
        assert_eq!(logits.dims(), [1, 8, 30]);

        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
        assert!(loss_val.is_finite(), "loss was {loss_val}");
        assert!(loss_val > 0.0);

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        let mut optim = AdamConfig::new().init();
        let model = optim.step(1e-2, model, grads);

        let after: Vec<f32> = model
            .projection
            .weight
            .val()
            .into_data()
            .to_vec()
            .unwrap();
        assert!(
            before.iter().zip(&after).any(|(b, a)| (b - a).abs() > 1e-9),
            "optimiser step left every projection weight unchanged",
        );
    }
}
