//! Ordered Cartesian product

use itertools::Itertools;

/// Every tuple taking one element from each dimension, in order.
///
/// The last dimension varies fastest and each dimension keeps its own order,
/// so the output is lexicographic in the inputs. Any empty dimension makes
/// the product empty.
pub fn ordered_product<'a, T, I>(dimensions: I) -> Vec<Vec<T>>
where
    T: Clone + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    dimensions
        .into_iter()
        .map(|d| d.iter().cloned())
        .multi_cartesian_product()
        .collect()
}
