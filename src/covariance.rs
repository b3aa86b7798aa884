use crate::error::{NucDataError, Result};
use crate::reaction_id::{ParticleId, ReactionId};
use crate::tabulated::validate_axis;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Identifies one side (rows or columns) of a covariance block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMetadata {
    projectile: ParticleId,
    target: ParticleId,
    reaction: ReactionId,
    /// Group boundaries in eV, `number_groups() + 1` values.
    energies: Vec<f64>,
}

impl CovarianceMetadata {
    pub fn new(
        projectile: ParticleId,
        target: ParticleId,
        reaction: ReactionId,
        energies: Vec<f64>,
    ) -> Result<Self> {
        validate_axis(&energies)?;
        Ok(Self {
            projectile,
            target,
            reaction,
            energies,
        })
    }

    pub fn projectile(&self) -> &ParticleId {
        &self.projectile
    }

    pub fn target(&self) -> &ParticleId {
        &self.target
    }

    pub fn reaction(&self) -> &ReactionId {
        &self.reaction
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn number_groups(&self) -> usize {
        self.energies.len() - 1
    }
}

/// Matrix values as handed over by a format adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawMatrix {
    /// Only the diagonal is given.
    Diagonal { values: Vec<f64> },
    /// Upper triangle of a symmetric matrix, packed row by row.
    SymmetricUpper { order: usize, values: Vec<f64> },
    /// Every element, row by row.
    Full {
        rows: usize,
        columns: usize,
        values: Vec<f64>,
    },
}

impl RawMatrix {
    /// True for the forms that declare the matrix symmetric.
    pub fn declares_symmetric(&self) -> bool {
        matches!(self, RawMatrix::Diagonal { .. } | RawMatrix::SymmetricUpper { .. })
    }

    /// Expand into a dense matrix.
    pub fn to_matrix(&self) -> Result<DMatrix<f64>> {
        match self {
            RawMatrix::Diagonal { values } => {
                let n = values.len();
                Ok(DMatrix::from_fn(n, n, |i, j| if i == j { values[i] } else { 0.0 }))
            }
            RawMatrix::SymmetricUpper { order, values } => {
                let n = *order;
                let expected = n
                    .checked_add(1)
                    .and_then(|m| n.checked_mul(m))
                    .map(|product| product / 2)
                    .ok_or_else(|| oversized(n, n))?;
                if values.len() != expected {
                    return Err(NucDataError::InvalidGrid(format!(
                        "packed upper triangle of order {} needs {} values, got {}",
                        n,
                        expected,
                        values.len()
                    )));
                }
                let mut matrix = DMatrix::<f64>::zeros(n, n);
                let mut k = 0;
                for i in 0..n {
                    for j in i..n {
                        matrix[(i, j)] = values[k];
                        matrix[(j, i)] = values[k];
                        k += 1;
                    }
                }
                Ok(matrix)
            }
            RawMatrix::Full {
                rows,
                columns,
                values,
            } => {
                let expected = rows
                    .checked_mul(*columns)
                    .ok_or_else(|| oversized(*rows, *columns))?;
                if values.len() != expected {
                    return Err(NucDataError::InvalidGrid(format!(
                        "{}x{} matrix needs {} values, got {}",
                        rows,
                        columns,
                        expected,
                        values.len()
                    )));
                }
                Ok(DMatrix::from_row_slice(*rows, *columns, values))
            }
        }
    }
}

fn oversized(rows: usize, columns: usize) -> NucDataError {
    NucDataError::InvalidGrid(format!("{}x{} matrix is too large to store", rows, columns))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingKind {
    /// Variances are multiplied by the factor.
    Direct,
    /// Variances are divided by the factor.
    Inverse,
}

/// Group-wise factors applied to the variances of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceScaling {
    kind: ScalingKind,
    /// Group boundaries in eV, one more than there are factors.
    energies: Vec<f64>,
    factors: Vec<f64>,
}

impl VarianceScaling {
    pub fn new(kind: ScalingKind, energies: Vec<f64>, factors: Vec<f64>) -> Result<Self> {
        validate_axis(&energies)?;
        if factors.len() + 1 != energies.len() {
            return Err(NucDataError::InvalidGrid(format!(
                "{} scaling factors need {} group boundaries, got {}",
                factors.len(),
                factors.len() + 1,
                energies.len()
            )));
        }
        let invalid = |f: f64| match kind {
            ScalingKind::Direct => !(f.is_finite() && f >= 0.0),
            ScalingKind::Inverse => !(f.is_finite() && f > 0.0),
        };
        if let Some(i) = factors.iter().position(|&f| invalid(f)) {
            return Err(NucDataError::InvalidGrid(format!(
                "invalid {:?} scaling factor {} in group {}",
                kind, factors[i], i
            )));
        }
        Ok(Self {
            kind,
            energies,
            factors,
        })
    }

    pub fn kind(&self) -> ScalingKind {
        self.kind
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// Factor of the group containing `energy`, if it is inside the grid.
    pub fn factor_at(&self, energy: f64) -> Option<f64> {
        let (first, last) = (self.energies.first()?, self.energies.last()?);
        if energy < *first || energy > *last {
            return None;
        }
        let group = self.energies.partition_point(|&e| e <= energy).saturating_sub(1);
        self.factors.get(group).or(self.factors.last()).copied()
    }

    // Multiplier applied to a variance in the group starting at `energy`
    fn variance_multiplier(&self, energy: f64) -> f64 {
        match (self.kind, self.factor_at(energy)) {
            (_, None) => 1.0,
            (ScalingKind::Direct, Some(f)) => f,
            (ScalingKind::Inverse, Some(f)) => 1.0 / f,
        }
    }
}

/// A covariance matrix between the groups of a row reaction and the groups
/// of a column reaction.
///
/// A block is diagonal when both sides carry the same metadata and
/// off-diagonal otherwise. Variance scaling is stored next to the unscaled
/// matrix; [`scaled_matrix`](Self::scaled_matrix) applies it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovarianceBlock {
    row: CovarianceMetadata,
    column: CovarianceMetadata,
    matrix: DMatrix<f64>,
    relative: bool,
    declared_symmetric: bool,
    scaling: Option<VarianceScaling>,
}

impl CovarianceBlock {
    pub fn new(
        row: CovarianceMetadata,
        column: CovarianceMetadata,
        raw: RawMatrix,
        relative: bool,
        scaling: Option<VarianceScaling>,
    ) -> Result<Self> {
        let matrix = raw.to_matrix()?;
        let (expected_rows, expected_cols) = (row.number_groups(), column.number_groups());
        if matrix.nrows() != expected_rows || matrix.ncols() != expected_cols {
            return Err(NucDataError::IncompatibleBlockShape {
                matrix_rows: matrix.nrows(),
                matrix_cols: matrix.ncols(),
                expected_rows,
                expected_cols,
            });
        }
        let block = Self {
            row,
            column,
            matrix,
            relative,
            declared_symmetric: raw.declares_symmetric(),
            scaling,
        };
        tracing::trace!(
            row = %block.row.reaction,
            column = %block.column.reaction,
            diagonal = block.is_diagonal_block(),
            relative,
            "classified covariance block"
        );
        Ok(block)
    }

    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn cols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn is_diagonal_block(&self) -> bool {
        self.row == self.column
    }

    pub fn is_off_diagonal_block(&self) -> bool {
        !self.is_diagonal_block()
    }

    pub fn is_relative_block(&self) -> bool {
        self.relative
    }

    pub fn is_absolute_block(&self) -> bool {
        !self.relative
    }

    /// True when both sides match and the source declared a symmetric form.
    pub fn is_symmetric(&self) -> bool {
        self.is_diagonal_block() && self.declared_symmetric
    }

    /// The unscaled matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn row_metadata(&self) -> &CovarianceMetadata {
        &self.row
    }

    pub fn column_metadata(&self) -> &CovarianceMetadata {
        &self.column
    }

    pub fn variance_scaling(&self) -> Option<&VarianceScaling> {
        self.scaling.as_ref()
    }

    /// The matrix with variance scaling applied.
    ///
    /// Element `(i, j)` is multiplied by `sqrt(g_i * g_j)`, where `g` is the
    /// scaling multiplier of the group's lower energy (the factor for direct
    /// scaling, its inverse for inverse scaling, one outside the scaling
    /// grid). Without scaling this is the unscaled matrix.
    pub fn scaled_matrix(&self) -> DMatrix<f64> {
        let scaling = match &self.scaling {
            Some(scaling) => scaling,
            None => return self.matrix.clone(),
        };
        let row_g: Vec<f64> = self.row.energies[..self.rows()]
            .iter()
            .map(|&e| scaling.variance_multiplier(e))
            .collect();
        let col_g: Vec<f64> = self.column.energies[..self.cols()]
            .iter()
            .map(|&e| scaling.variance_multiplier(e))
            .collect();
        DMatrix::from_fn(self.rows(), self.cols(), |i, j| {
            self.matrix[(i, j)] * (row_g[i] * col_g[j]).sqrt()
        })
    }

    /// Square roots of the variances; only defined for diagonal blocks.
    pub fn standard_deviations(&self) -> Option<Vec<f64>> {
        if !self.is_diagonal_block() {
            return None;
        }
        Some(self.matrix.diagonal().iter().map(|v| v.sqrt()).collect())
    }

    /// Correlation matrix of a diagonal block. Groups with zero variance
    /// have zero correlation with every group.
    pub fn correlation_matrix(&self) -> Option<DMatrix<f64>> {
        let sigma = self.standard_deviations()?;
        Some(DMatrix::from_fn(self.rows(), self.cols(), |i, j| {
            let denominator = sigma[i] * sigma[j];
            if denominator > 0.0 {
                self.matrix[(i, j)] / denominator
            } else {
                0.0
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(code: i32, groups: usize) -> CovarianceMetadata {
        let energies = (0..=groups).map(|g| 10f64.powi(g as i32)).collect();
        CovarianceMetadata::new(
            ParticleId::new("n").unwrap(),
            ParticleId::new("Fe56").unwrap(),
            ReactionId::from_code(code),
            energies,
        )
        .unwrap()
    }

    #[test]
    fn test_off_diagonal_rectangular_block() {
        let raw = RawMatrix::Full {
            rows: 6,
            columns: 10,
            values: vec![0.01; 60],
        };
        let block = CovarianceBlock::new(metadata(2, 6), metadata(102, 10), raw, true, None).unwrap();
        assert_eq!(block.rows(), 6);
        assert_eq!(block.cols(), 10);
        assert!(!block.is_diagonal_block());
        assert!(block.is_off_diagonal_block());
        assert!(block.is_relative_block());
        assert!(!block.is_symmetric());
        assert!(block.standard_deviations().is_none());
        assert!(block.correlation_matrix().is_none());
    }

    #[test]
    fn test_shape_mismatch() {
        let raw = RawMatrix::Diagonal { values: vec![1.0; 3] };
        let result = CovarianceBlock::new(metadata(2, 4), metadata(2, 4), raw, false, None);
        assert_eq!(
            result,
            Err(NucDataError::IncompatibleBlockShape {
                matrix_rows: 3,
                matrix_cols: 3,
                expected_rows: 4,
                expected_cols: 4,
            })
        );
    }

    #[test]
    fn test_packed_upper_triangle() {
        let raw = RawMatrix::SymmetricUpper {
            order: 3,
            values: vec![4.0, 1.0, 0.0, 9.0, 3.0, 16.0],
        };
        let block = CovarianceBlock::new(metadata(2, 3), metadata(2, 3), raw, false, None).unwrap();
        assert!(block.is_diagonal_block());
        assert!(block.is_absolute_block());
        assert!(block.is_symmetric());
        assert_eq!(block.matrix()[(1, 0)], 1.0);
        assert_eq!(block.matrix()[(2, 1)], 3.0);
        assert_eq!(block.standard_deviations().unwrap(), vec![2.0, 3.0, 4.0]);
        let correlation = block.correlation_matrix().unwrap();
        assert!((correlation[(0, 1)] - 1.0 / 6.0).abs() < 1e-15);
        assert_eq!(correlation[(2, 2)], 1.0);

        let short = RawMatrix::SymmetricUpper {
            order: 3,
            values: vec![1.0; 5],
        };
        assert!(matches!(short.to_matrix(), Err(NucDataError::InvalidGrid(_))));
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let full = RawMatrix::Full {
            rows: 1 << 33,
            columns: 1 << 31,
            values: vec![],
        };
        assert!(matches!(full.to_matrix(), Err(NucDataError::InvalidGrid(_))));
        let packed = RawMatrix::SymmetricUpper {
            order: usize::MAX,
            values: vec![],
        };
        assert!(matches!(packed.to_matrix(), Err(NucDataError::InvalidGrid(_))));

        // wraps to zero elements without the overflow check
        let json = r#"{"type": "Full", "rows": 4294967296, "columns": 4294967296, "values": []}"#;
        let raw: RawMatrix = serde_json::from_str(json).unwrap();
        assert!(matches!(raw.to_matrix(), Err(NucDataError::InvalidGrid(_))));
    }

    #[test]
    fn test_full_form_is_not_declared_symmetric() {
        let raw = RawMatrix::Full {
            rows: 2,
            columns: 2,
            values: vec![1.0, 0.5, 0.5, 1.0],
        };
        let block = CovarianceBlock::new(metadata(2, 2), metadata(2, 2), raw, true, None).unwrap();
        assert!(block.is_diagonal_block());
        assert!(!block.is_symmetric());
    }

    #[test]
    fn test_variance_scaling() {
        let scaling = VarianceScaling::new(ScalingKind::Inverse, vec![1.0, 10.0, 1000.0], vec![4.0, 1.0]).unwrap();
        assert_eq!(scaling.factor_at(5.0), Some(4.0));
        assert_eq!(scaling.factor_at(10.0), Some(1.0));
        assert_eq!(scaling.factor_at(1000.0), Some(1.0));
        assert_eq!(scaling.factor_at(0.5), None);

        let empty: VarianceScaling =
            serde_json::from_str(r#"{"kind": "direct", "energies": [], "factors": []}"#).unwrap();
        assert_eq!(empty.factor_at(1.0), None);

        let raw = RawMatrix::Diagonal {
            values: vec![1.0, 1.0, 1.0],
        };
        let block = CovarianceBlock::new(metadata(2, 3), metadata(2, 3), raw, true, Some(scaling)).unwrap();
        // the unscaled matrix is kept as given
        assert_eq!(block.matrix()[(0, 0)], 1.0);
        let scaled = block.scaled_matrix();
        assert!((scaled[(0, 0)] - 0.25).abs() < 1e-15);
        assert_eq!(scaled[(1, 1)], 1.0);
        assert_eq!(scaled[(2, 2)], 1.0);
        assert_eq!(block.variance_scaling().unwrap().kind(), ScalingKind::Inverse);
    }

    #[test]
    fn test_scaling_validation() {
        assert!(VarianceScaling::new(ScalingKind::Direct, vec![1.0, 2.0], vec![1.0, 2.0]).is_err());
        assert!(VarianceScaling::new(ScalingKind::Inverse, vec![1.0, 2.0], vec![0.0]).is_err());
        assert!(VarianceScaling::new(ScalingKind::Direct, vec![1.0, 2.0], vec![0.0]).is_ok());
    }
}
