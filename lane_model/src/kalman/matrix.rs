use std::{fmt, ops};

use anyhow::{bail, Result};

/// A small dense row-major matrix. Cloning copies the data; there's no sharing between copies.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Matrix {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Builds a matrix from row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        if data.len() != rows * cols {
            bail!(
                "{} values can't fill a {}x{} matrix",
                data.len(),
                rows,
                cols
            );
        }
        Ok(Matrix { rows, cols, data })
    }

    /// A column vector.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// A 1x1 matrix.
    pub fn scalar(value: f64) -> Matrix {
        Matrix::column(&[value])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                t.set(c, r, self.get(r, c));
            }
        }
        t
    }

    /// Closed-form inverse for 1x1 and 2x2 matrices. None if the matrix is singular or bigger.
    pub fn inverse(&self) -> Option<Matrix> {
        if self.rows != self.cols {
            return None;
        }
        match self.rows {
            1 => {
                let v = self.get(0, 0);
                if v.abs() < f64::EPSILON {
                    return None;
                }
                Some(Matrix::scalar(1.0 / v))
            }
            2 => {
                let (a, b, c, d) = (self.get(0, 0), self.get(0, 1), self.get(1, 0), self.get(1, 1));
                let det = a * d - b * c;
                if det.abs() < f64::EPSILON {
                    return None;
                }
                Some(Matrix {
                    rows: 2,
                    cols: 2,
                    data: vec![d / det, -b / det, -c / det, a / det],
                })
            }
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// (M + Mᵗ) / 2, to wash out rounding asymmetry in covariances.
    pub fn symmetrized(&self) -> Matrix {
        let t = self.transpose();
        &(self + &t) * 0.5
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Multiplication that reports a shape mismatch instead of panicking.
    pub fn checked_mul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            bail!(
                "can't multiply {}x{} by {}x{}",
                self.rows,
                self.cols,
                other.rows,
                other.cols
            );
        }
        Ok(self * other)
    }

    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Matrix, op: &str, f: F) -> Matrix {
        if !self.same_shape(other) {
            panic!(
                "can't {} {}x{} and {}x{}",
                op, self.rows, self.cols, other.rows, other.cols
            );
        }
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }

    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|x| f(*x)).collect(),
        }
    }
}

impl ops::Add for &Matrix {
    type Output = Matrix;

    fn add(self, other: &Matrix) -> Matrix {
        self.zip_with(other, "add", |a, b| a + b)
    }
}

impl ops::Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, other: &Matrix) -> Matrix {
        self.zip_with(other, "subtract", |a, b| a - b)
    }
}

impl ops::Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, other: &Matrix) -> Matrix {
        if self.cols != other.rows {
            panic!(
                "can't multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            );
        }
        let mut result = Matrix::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.get(r, k) * other.get(k, c);
                }
                result.set(r, c, sum);
            }
        }
        result
    }
}

impl ops::Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }
}

impl ops::Div<f64> for &Matrix {
    type Output = Matrix;

    fn div(self, scalar: f64) -> Matrix {
        self.map(|x| x / scalar)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for r in 0..self.rows {
            let row: Vec<String> = (0..self.cols).map(|c| self.get(r, c).to_string()).collect();
            writeln!(f, "[{}]", row.join(", "))?;
        }
        Ok(())
    }
}
