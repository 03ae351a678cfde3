use nalgebra::{DMatrix, DVector};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// First and second moment estimates for one dense layer.
#[derive(Debug, Clone)]
struct Moments {
    weights_m: DMatrix<f64>,
    weights_v: DMatrix<f64>,
    bias_m: DVector<f64>,
    bias_v: DVector<f64>,
}

/// Adam optimizer state for a stack of dense layers.
#[derive(Debug, Clone)]
pub(crate) struct Adam {
    learning_rate: f64,
    step: i32,
    moments: Vec<Moments>,
}

impl Adam {
    /// `shapes` lists `(inputs, outputs)` per layer.
    pub(crate) fn new(learning_rate: f64, shapes: &[(usize, usize)]) -> Self {
        let moments = shapes
            .iter()
            .map(|&(inputs, outputs)| Moments {
                weights_m: DMatrix::zeros(inputs, outputs),
                weights_v: DMatrix::zeros(inputs, outputs),
                bias_m: DVector::zeros(outputs),
                bias_v: DVector::zeros(outputs),
            })
            .collect();
        Self {
            learning_rate,
            step: 0,
            moments,
        }
    }

    /// Advances the shared time step; call once per mini-batch before the layer updates.
    pub(crate) fn begin_step(&mut self) {
        self.step = self.step.saturating_add(1);
    }

    pub(crate) fn update(
        &mut self,
        layer: usize,
        weights: &mut DMatrix<f64>,
        bias: &mut DVector<f64>,
        weight_grad: &DMatrix<f64>,
        bias_grad: &DVector<f64>,
    ) {
        let correction1 = 1.0 - BETA1.powi(self.step);
        let correction2 = 1.0 - BETA2.powi(self.step);
        let rate = self.learning_rate;
        let m = &mut self.moments[layer];

        m.weights_m = &m.weights_m * BETA1 + weight_grad * (1.0 - BETA1);
        m.weights_v = &m.weights_v * BETA2 + weight_grad.map(|g| g * g) * (1.0 - BETA2);
        m.bias_m = &m.bias_m * BETA1 + bias_grad * (1.0 - BETA1);
        m.bias_v = &m.bias_v * BETA2 + bias_grad.map(|g| g * g) * (1.0 - BETA2);

        weights.zip_zip_apply(&m.weights_m, &m.weights_v, |w, mean, var| {
            *w -= rate * (mean / correction1) / ((var / correction2).sqrt() + EPSILON);
        });
        bias.zip_zip_apply(&m.bias_m, &m.bias_v, |b, mean, var| {
            *b -= rate * (mean / correction1) / ((var / correction2).sqrt() + EPSILON);
        });
    }
}
