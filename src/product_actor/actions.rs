/// Custom actions for Product entities.
///
/// These are the only operations that touch stock outside of an explicit
/// admin edit. Each one answers with the stock level left afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Decrements stock by the given quantity.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if the quantity exceeds what is on hand.
    ReserveStock(u32),
    /// Puts previously reserved units back on the shelf.
    ReleaseStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    ReserveStock(u32),
    ReleaseStock(u32),
}
