use super::optimizer::Adam;
use super::{Regressor, Trainer, TrainingError, TrainingHistory, mean_squared_error};
use crate::engine::config::TrainingConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::{DMatrix, DVector};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument, trace};

#[derive(Debug, Clone, PartialEq)]
struct DenseLayer {
    /// `inputs × outputs`, so a batch multiplies from the left.
    weights: DMatrix<f64>,
    bias: DVector<f64>,
}

impl DenseLayer {
    fn he_uniform(inputs: usize, outputs: usize, rng: &mut impl Rng) -> Self {
        let limit = (6.0 / inputs.max(1) as f64).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        Self {
            weights: DMatrix::from_fn(inputs, outputs, |_, _| dist.sample(rng)),
            bias: DVector::zeros(outputs),
        }
    }

    fn forward(&self, input: &DMatrix<f64>) -> DMatrix<f64> {
        let mut z = input * &self.weights;
        for (mut column, b) in z.column_iter_mut().zip(self.bias.iter()) {
            column.add_scalar_mut(*b);
        }
        z
    }
}

fn relu(z: &DMatrix<f64>) -> DMatrix<f64> {
    z.map(|v| v.max(0.0))
}

fn relu_mask(z: &DMatrix<f64>) -> DMatrix<f64> {
    z.map(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

fn forward(layers: &[DenseLayer], features: &DMatrix<f64>) -> DMatrix<f64> {
    let last = layers.len().saturating_sub(1);
    layers
        .iter()
        .enumerate()
        .fold(features.clone(), |activation, (i, layer)| {
            let z = layer.forward(&activation);
            if i < last { relu(&z) } else { z }
        })
}

/// Gradients of the mean squared error with respect to every layer's parameters.
fn gradients(
    layers: &[DenseLayer],
    features: &DMatrix<f64>,
    targets: &DMatrix<f64>,
) -> Vec<(DMatrix<f64>, DVector<f64>)> {
    let last = layers.len() - 1;
    let mut activations = Vec::with_capacity(layers.len() + 1);
    let mut pre_activations = Vec::with_capacity(layers.len());
    activations.push(features.clone());
    for (i, layer) in layers.iter().enumerate() {
        let z = layer.forward(&activations[i]);
        activations.push(if i < last { relu(&z) } else { z.clone() });
        pre_activations.push(z);
    }

    let output = &activations[layers.len()];
    let mut delta = (output - targets) * (2.0 / output.len() as f64);
    let mut grads = Vec::with_capacity(layers.len());
    for i in (0..layers.len()).rev() {
        let weight_grad = activations[i].transpose() * &delta;
        let bias_grad = delta.row_sum().transpose();
        if i > 0 {
            let upstream = &delta * layers[i].weights.transpose();
            delta = upstream.component_mul(&relu_mask(&pre_activations[i - 1]));
        }
        grads.push((weight_grad, bias_grad));
    }
    grads.reverse();
    grads
}

/// Shuffled split of `0..n` into training and validation indices.
fn split_indices(n: usize, fraction: f64, rng: &mut impl Rng) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let validation = if n >= 2 && fraction > 0.0 {
        ((n as f64 * fraction).round() as usize).clamp(1, n - 1)
    } else {
        0
    };
    let training = indices.split_off(validation);
    (training, indices)
}

/// A trained dense feed-forward network with ReLU hidden layers and a linear output.
#[derive(Debug, Clone, PartialEq)]
pub struct MlpRegressor {
    layers: Vec<DenseLayer>,
    history: TrainingHistory,
}

impl MlpRegressor {
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Widths of every layer, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_dim())
            .chain(self.layers.iter().map(|layer| layer.bias.len()))
            .collect()
    }
}

impl Regressor for MlpRegressor {
    fn predict(&self, features: &DMatrix<f64>) -> DMatrix<f64> {
        forward(&self.layers, features)
    }

    fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.weights.nrows())
    }

    fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.bias.len())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MlpTrainer {
    config: TrainingConfig,
}

impl MlpTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

impl Trainer for MlpTrainer {
    type Model = MlpRegressor;

    #[instrument(skip_all, name = "mlp_training", fields(samples = features.nrows()))]
    fn fit(
        &self,
        features: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        reporter: &ProgressReporter,
    ) -> Result<MlpRegressor, TrainingError> {
        let config = &self.config;
        config
            .validate()
            .map_err(|e| TrainingError::InvalidConfig(e.to_string()))?;
        let n = features.nrows();
        if n == 0 {
            return Err(TrainingError::EmptyTrainingSet);
        }
        if targets.nrows() != n {
            return Err(TrainingError::SampleCountMismatch {
                features: n,
                targets: targets.nrows(),
            });
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let (train_idx, val_idx) = split_indices(n, config.validation_fraction, &mut rng);
        let x_train = features.select_rows(&train_idx);
        let y_train = targets.select_rows(&train_idx);
        let x_val = features.select_rows(&val_idx);
        let y_val = targets.select_rows(&val_idx);
        info!(
            "Training on {} sample(s), validating on {}.",
            train_idx.len(),
            val_idx.len()
        );

        let widths: Vec<usize> = std::iter::once(features.ncols())
            .chain(config.hidden_layers.iter().copied())
            .chain(std::iter::once(targets.ncols()))
            .collect();
        let shapes: Vec<(usize, usize)> = widths.windows(2).map(|w| (w[0], w[1])).collect();
        let mut layers: Vec<DenseLayer> = shapes
            .iter()
            .map(|&(inputs, outputs)| DenseLayer::he_uniform(inputs, outputs, &mut rng))
            .collect();
        let mut adam = Adam::new(config.learning_rate, &shapes);

        let mut history = TrainingHistory {
            best_loss: f64::INFINITY,
            ..TrainingHistory::default()
        };
        let mut best_layers = layers.clone();
        let mut epochs_without_improvement = 0usize;
        let mut order: Vec<usize> = (0..train_idx.len()).collect();

        reporter.report(Progress::TaskStart {
            total_steps: config.max_epochs as u64,
        });
        for epoch in 0..config.max_epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(config.batch_size) {
                let xb = x_train.select_rows(batch);
                let yb = y_train.select_rows(batch);
                let grads = gradients(&layers, &xb, &yb);
                adam.begin_step();
                for (i, (layer, (weight_grad, bias_grad))) in
                    layers.iter_mut().zip(grads).enumerate()
                {
                    adam.update(
                        i,
                        &mut layer.weights,
                        &mut layer.bias,
                        &weight_grad,
                        &bias_grad,
                    );
                }
            }

            let train_loss = mean_squared_error(&forward(&layers, &x_train), &y_train);
            let validation_loss = (!val_idx.is_empty())
                .then(|| mean_squared_error(&forward(&layers, &x_val), &y_val));
            let monitored = validation_loss.unwrap_or(train_loss);
            if !train_loss.is_finite() || !monitored.is_finite() {
                reporter.report(Progress::TaskFinish);
                return Err(TrainingError::Diverged { epoch });
            }

            history.train_losses.push(train_loss);
            if let Some(loss) = validation_loss {
                history.validation_losses.push(loss);
            }
            reporter.report(Progress::EpochFinished {
                epoch,
                train_loss,
                validation_loss,
            });
            reporter.report(Progress::TaskIncrement);
            trace!(epoch, train_loss, ?validation_loss, "Epoch finished.");

            if monitored < history.best_loss - config.min_delta {
                history.best_loss = monitored;
                history.best_epoch = epoch;
                best_layers.clone_from(&layers);
                epochs_without_improvement = 0;
            } else {
                epochs_without_improvement += 1;
                if epochs_without_improvement >= config.patience {
                    history.stopped_early = true;
                    break;
                }
            }
        }
        reporter.report(Progress::TaskFinish);

        info!(
            "Training finished after {} epoch(s); restoring weights from epoch {} (loss {:.6}).",
            history.epochs_run(),
            history.best_epoch + 1,
            history.best_loss
        );
        Ok(MlpRegressor {
            layers: best_layers,
            history,
        })
    }
}
