//! The labeled in-memory dataset model.
//!
//! A [`Dataset`] holds named dimensions, 1-D coordinate variables
//! aligned to those dimensions, N-D data variables over a subset of
//! dimensions, and a dataset-level attribute map. Values are stored
//! row-major as `f64`; a cell is missing when it is NaN or equal to
//! the variable's `_FillValue` attribute.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attr::{AttrMap, AttrValue};
use crate::error::{DatasetError, DatasetResult};

/// A named N-D array with attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Dimension names, outermost first.
    pub dims: Vec<String>,
    /// Length along each dimension, same order as `dims`.
    pub shape: Vec<usize>,
    /// Row-major cell values.
    pub values: Vec<f64>,
    /// Variable attributes.
    pub attrs: AttrMap,
}

impl Variable {
    /// Create a variable; the caller is responsible for shape/values
    /// agreement (validated again when inserted into a dataset).
    pub fn new(dims: Vec<String>, shape: Vec<usize>, values: Vec<f64>) -> Self {
        Self {
            dims,
            shape,
            values,
            attrs: AttrMap::new(),
        }
    }

    /// Attach an attribute (builder style).
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the variable has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up an attribute.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Look up a string attribute.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_str)
    }

    /// Position of a dimension within this variable, if present.
    pub fn dim_index(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// The declared fill value, if any.
    pub fn fill_value(&self) -> Option<f64> {
        self.attrs.get("_FillValue").and_then(AttrValue::as_f64)
    }

    /// Whether a cell value counts as missing/undefined.
    pub fn is_missing_value(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        match self.fill_value() {
            Some(fill) => value == fill,
            None => false,
        }
    }

    /// Value at a multi-dimensional index (row-major).
    pub fn value_at(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, &n) in index.iter().zip(self.shape.iter()) {
            if i >= n {
                return None;
            }
            flat = flat * n + i;
        }
        self.values.get(flat).copied()
    }
}

/// An immutable-by-contract container of dimensions, coordinates,
/// data variables, and attributes.
///
/// The checking engines take `&Dataset` and never mutate it; the fixer
/// clones the dataset, patches the private copy, and returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    dims: BTreeMap<String, usize>,
    coords: BTreeMap<String, Variable>,
    data_vars: BTreeMap<String, Variable>,
    attrs: AttrMap,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named dimension (builder style).
    pub fn with_dim(mut self, name: &str, size: usize) -> Self {
        self.dims.insert(name.to_string(), size);
        self
    }

    /// Add a 1-D coordinate variable aligned to an existing dimension.
    pub fn with_coord(mut self, name: &str, coord: Variable) -> DatasetResult<Self> {
        self.insert_coord(name, coord)?;
        Ok(self)
    }

    /// Add an N-D data variable over existing dimensions.
    pub fn with_var(mut self, name: &str, var: Variable) -> DatasetResult<Self> {
        self.insert_var(name, var)?;
        Ok(self)
    }

    /// Set a dataset-level attribute (builder style).
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Insert a coordinate variable, validating alignment.
    pub fn insert_coord(&mut self, name: &str, coord: Variable) -> DatasetResult<()> {
        if coord.dims.len() != 1 {
            return Err(DatasetError::CoordinateNot1D(name.to_string()));
        }
        let dim = coord.dims[0].clone();
        let size = *self
            .dims
            .get(&dim)
            .ok_or_else(|| DatasetError::UnknownDimension {
                name: name.to_string(),
                dim: dim.clone(),
            })?;
        if coord.values.len() != size {
            return Err(DatasetError::CoordinateLengthMismatch {
                name: name.to_string(),
                dim,
                len: coord.values.len(),
                size,
            });
        }
        let mut coord = coord;
        coord.shape = vec![size];
        self.coords.insert(name.to_string(), coord);
        Ok(())
    }

    /// Insert a data variable, validating its dimensions and shape.
    pub fn insert_var(&mut self, name: &str, var: Variable) -> DatasetResult<()> {
        let mut shape = Vec::with_capacity(var.dims.len());
        for dim in &var.dims {
            let size = *self
                .dims
                .get(dim)
                .ok_or_else(|| DatasetError::UnknownDimension {
                    name: name.to_string(),
                    dim: dim.clone(),
                })?;
            shape.push(size);
        }
        let expected: usize = shape.iter().product();
        if var.values.len() != expected {
            return Err(DatasetError::ShapeMismatch {
                name: name.to_string(),
                len: var.values.len(),
                expected,
            });
        }
        let mut var = var;
        var.shape = shape;
        self.data_vars.insert(name.to_string(), var);
        Ok(())
    }

    /// Dimension size, if the dimension exists.
    pub fn dim_size(&self, name: &str) -> Option<usize> {
        self.dims.get(name).copied()
    }

    /// Whether a dimension with this name exists.
    pub fn has_dim(&self, name: &str) -> bool {
        self.dims.contains_key(name)
    }

    /// Iterate dimensions as (name, size).
    pub fn dims(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dims.iter().map(|(name, size)| (name.as_str(), *size))
    }

    /// Look up a coordinate variable.
    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    /// Mutable access to a coordinate variable (used by the fixer on
    /// its private copy).
    pub fn coord_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.coords.get_mut(name)
    }

    /// Iterate coordinate variables in name order.
    pub fn coords(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.coords.iter().map(|(name, var)| (name.as_str(), var))
    }

    /// Look up a data variable.
    pub fn data_var(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name)
    }

    /// Mutable access to a data variable.
    pub fn data_var_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.data_vars.get_mut(name)
    }

    /// Iterate data variables in name order.
    pub fn data_vars(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.data_vars.iter().map(|(name, var)| (name.as_str(), var))
    }

    /// Whether any coordinate or data variable has this name.
    pub fn has_variable(&self, name: &str) -> bool {
        self.coords.contains_key(name) || self.data_vars.contains_key(name)
    }

    /// Dataset-level attributes.
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Mutable dataset-level attributes.
    pub fn attrs_mut(&mut self) -> &mut AttrMap {
        &mut self.attrs
    }

    /// Look up a dataset-level attribute.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Look up a dataset-level string attribute.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(dim: &str, values: Vec<f64>) -> Variable {
        let n = values.len();
        Variable::new(vec![dim.to_string()], vec![n], values)
    }

    #[test]
    fn test_insert_coord_validates_dimension() {
        let ds = Dataset::new().with_dim("lat", 3);
        let result = ds.clone().with_coord("lon", coord("lon", vec![0.0, 1.0]));
        assert!(matches!(
            result,
            Err(DatasetError::UnknownDimension { .. })
        ));

        let result = ds.with_coord("lat", coord("lat", vec![0.0, 1.0]));
        assert!(matches!(
            result,
            Err(DatasetError::CoordinateLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_insert_var_validates_shape() {
        let ds = Dataset::new().with_dim("lat", 2).with_dim("lon", 3);
        let bad = Variable::new(
            vec!["lat".to_string(), "lon".to_string()],
            vec![],
            vec![0.0; 5],
        );
        assert!(matches!(
            ds.clone().with_var("sst", bad),
            Err(DatasetError::ShapeMismatch { .. })
        ));

        let good = Variable::new(
            vec!["lat".to_string(), "lon".to_string()],
            vec![],
            vec![0.0; 6],
        );
        let ds = ds.with_var("sst", good).unwrap();
        assert_eq!(ds.data_var("sst").unwrap().shape, vec![2, 3]);
    }

    #[test]
    fn test_value_at_row_major() {
        let ds = Dataset::new()
            .with_dim("lat", 2)
            .with_dim("lon", 3)
            .with_var(
                "sst",
                Variable::new(
                    vec!["lat".to_string(), "lon".to_string()],
                    vec![],
                    (0..6).map(|i| i as f64).collect(),
                ),
            )
            .unwrap();
        let var = ds.data_var("sst").unwrap();
        assert_eq!(var.value_at(&[0, 0]), Some(0.0));
        assert_eq!(var.value_at(&[0, 2]), Some(2.0));
        assert_eq!(var.value_at(&[1, 0]), Some(3.0));
        assert_eq!(var.value_at(&[1, 2]), Some(5.0));
        assert_eq!(var.value_at(&[2, 0]), None);
        assert_eq!(var.value_at(&[0]), None);
    }

    #[test]
    fn test_missing_value_semantics() {
        let var = Variable::new(vec!["x".to_string()], vec![3], vec![1.0, f64::NAN, -999.0])
            .with_attr("_FillValue", -999.0);
        assert!(!var.is_missing_value(1.0));
        assert!(var.is_missing_value(f64::NAN));
        assert!(var.is_missing_value(-999.0));

        let no_fill = Variable::new(vec!["x".to_string()], vec![1], vec![-999.0]);
        assert!(!no_fill.is_missing_value(-999.0));
    }

    #[test]
    fn test_dataset_equality_covers_attrs_and_values() {
        let a = Dataset::new()
            .with_dim("x", 1)
            .with_attr("title", "a")
            .with_var("v", Variable::new(vec!["x".to_string()], vec![], vec![1.0]))
            .unwrap();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.attrs_mut().insert("title".to_string(), "b".into());
        assert_ne!(a, b);
    }
}
