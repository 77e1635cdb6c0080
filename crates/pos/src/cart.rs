//! The shopping cart: an ordered list of line items and its total.
//!
//! A line item is one catalog product at one charged price. Adding the same
//! product at the same price bumps the quantity of the existing line instead
//! of appending a new one, so no two lines ever share a (product, price) pair.
//!
//! # Missing lines
//!
//! Every operation that addresses a line by [`LineId`] treats an unknown id
//! as a no-op and reports [`LineUpdate::NotFound`]. Only invalid input is an
//! error: a negative price, or a change that would make the total overflow.
//! A rejected call leaves the cart unchanged.

use minibar_core::{CurrencyCode, LineId, Price, Product};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors returned by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A custom price below zero was requested.
    #[error("Invalid price: {0} (price cannot be negative)")]
    InvalidPrice(Decimal),

    /// The change would push the cart total beyond what can be represented.
    #[error("Amount too large: the cart total would overflow")]
    AmountTooLarge,

    /// Every line id has been handed out; ids are never reused.
    #[error("No line ids left in this cart")]
    LineIdsExhausted,
}

/// What a line-addressed mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineUpdate {
    /// The line was changed in place.
    Updated,
    /// The line was deleted.
    Removed,
    /// The line took over another line with the same product and price.
    Merged {
        /// The line that was folded into the addressed one.
        absorbed: LineId,
    },
    /// No line has the given id; nothing changed.
    NotFound,
}

/// One product at one charged price, with a quantity of at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    id: LineId,
    product: Product,
    quantity: u32,
    unit_price: Decimal,
}

impl LineItem {
    /// The cart-local line id.
    #[must_use]
    pub const fn id(&self) -> LineId {
        self.id
    }

    /// The product as it was in the catalog when the line was created.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Number of units, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The charged unit price. Defaults to the catalog price.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Returns true if the charged price differs from the catalog price.
    #[must_use]
    pub fn is_custom_price(&self) -> bool {
        self.unit_price != self.product.price().amount
    }

    /// `quantity × unit_price`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    fn is_same_offer(&self, product: &Product, unit_price: Decimal) -> bool {
        self.product.name() == product.name() && self.unit_price == unit_price
    }
}

/// The order being assembled at the register.
///
/// Constructed once at start-up and handed to whoever renders or checks it
/// out; all mutation goes through its methods.
#[derive(Debug, Clone)]
pub struct Cart {
    currency: CurrencyCode,
    lines: Vec<LineItem>,
    next_id: Option<LineId>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

impl Cart {
    /// Create an empty cart that totals in `currency`.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            currency,
            lines: Vec::new(),
            next_id: Some(LineId::new(1)),
        }
    }

    /// Add one unit of `product` at its catalog price.
    ///
    /// Returns the id of the line that received the unit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountTooLarge`] if the cart total would no
    /// longer be representable, or [`CartError::LineIdsExhausted`] if a new
    /// line is needed and no id is left.
    pub fn add_item(&mut self, product: &Product) -> Result<LineId, CartError> {
        self.insert(product, product.price().amount)
    }

    /// Add one unit of `product` at a custom unit price.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] if `unit_price` is negative, and
    /// otherwise fails like [`Cart::add_item`].
    pub fn add_item_at(
        &mut self,
        product: &Product,
        unit_price: Decimal,
    ) -> Result<LineId, CartError> {
        validate_price(unit_price)?;
        self.insert(product, unit_price)
    }

    fn insert(&mut self, product: &Product, unit_price: Decimal) -> Result<LineId, CartError> {
        if let Some(id) = self
            .lines
            .iter()
            .find(|line| line.is_same_offer(product, unit_price))
            .map(|line| line.id)
        {
            self.ensure_total_fits(
                |line| {
                    let quantity = if line.id == id {
                        line.quantity.saturating_add(1)
                    } else {
                        line.quantity
                    };
                    Some((quantity, line.unit_price))
                },
                None,
            )?;
            if let Some(line) = self.line_mut(id) {
                line.quantity = line.quantity.saturating_add(1);
                debug!(line = %id, quantity = line.quantity, "Incremented cart line");
            }
            return Ok(id);
        }

        let id = self.next_id.ok_or(CartError::LineIdsExhausted)?;
        self.ensure_total_fits(
            |line| Some((line.quantity, line.unit_price)),
            Some((1, unit_price)),
        )?;
        self.next_id = id.next();
        self.lines.push(LineItem {
            id,
            product: product.clone(),
            quantity: 1,
            unit_price,
        });
        debug!(line = %id, product = %product.name(), %unit_price, "Added cart line");
        Ok(id)
    }

    /// Delete a line regardless of its quantity.
    pub fn remove_item(&mut self, id: LineId) -> LineUpdate {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        if self.lines.len() == before {
            debug!(line = %id, "Remove ignored, no such line");
            return LineUpdate::NotFound;
        }
        debug!(line = %id, "Removed cart line");
        LineUpdate::Removed
    }

    /// Set a line's quantity directly.
    ///
    /// Zero or a negative quantity deletes the line. Quantities above
    /// `u32::MAX` are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountTooLarge`] if the new quantity would push
    /// the cart total out of range. The line keeps its old quantity.
    pub fn set_quantity(&mut self, id: LineId, quantity: i64) -> Result<LineUpdate, CartError> {
        if quantity <= 0 {
            return Ok(self.remove_item(id));
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if self.line(id).is_none() {
            debug!(line = %id, "Quantity change ignored, no such line");
            return Ok(LineUpdate::NotFound);
        }

        self.ensure_total_fits(
            |line| {
                let quantity = if line.id == id { quantity } else { line.quantity };
                Some((quantity, line.unit_price))
            },
            None,
        )?;
        if let Some(line) = self.line_mut(id) {
            line.quantity = quantity;
        }
        debug!(line = %id, quantity, "Set cart line quantity");
        Ok(LineUpdate::Updated)
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Fails like [`Cart::set_quantity`].
    pub fn increment(&mut self, id: LineId) -> Result<LineUpdate, CartError> {
        match self.line(id) {
            Some(line) => {
                let next = i64::from(line.quantity) + 1;
                self.set_quantity(id, next)
            }
            None => Ok(LineUpdate::NotFound),
        }
    }

    /// Take one unit off a line, deleting it when the last unit goes.
    pub fn decrement(&mut self, id: LineId) -> LineUpdate {
        let Some(quantity) = self.line(id).map(|line| line.quantity) else {
            debug!(line = %id, "Decrement ignored, no such line");
            return LineUpdate::NotFound;
        };
        if quantity <= 1 {
            return self.remove_item(id);
        }
        if let Some(line) = self.line_mut(id) {
            line.quantity = quantity - 1;
        }
        debug!(line = %id, quantity = quantity - 1, "Decremented cart line");
        LineUpdate::Updated
    }

    /// Override the charged unit price of a line.
    ///
    /// If another line already charges `price` for the same product, the two
    /// are merged: the addressed line keeps its id and position and absorbs
    /// the other line's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] if `price` is negative and
    /// [`CartError::AmountTooLarge`] if the cart total would go out of range.
    /// The cart is left untouched in both cases.
    pub fn set_custom_price(
        &mut self,
        id: LineId,
        price: Decimal,
    ) -> Result<LineUpdate, CartError> {
        validate_price(price)?;

        let Some((product, quantity)) = self
            .line(id)
            .map(|line| (line.product.clone(), line.quantity))
        else {
            debug!(line = %id, "Price change ignored, no such line");
            return Ok(LineUpdate::NotFound);
        };

        let twin = self
            .lines
            .iter()
            .find(|line| line.id != id && line.is_same_offer(&product, price))
            .map(|line| (line.id, line.quantity));
        let merged_quantity = twin.map_or(quantity, |(_, absorbed)| {
            quantity.saturating_add(absorbed)
        });

        self.ensure_total_fits(
            |line| {
                if line.id == id {
                    Some((merged_quantity, price))
                } else if twin.is_some_and(|(twin_id, _)| twin_id == line.id) {
                    None
                } else {
                    Some((line.quantity, line.unit_price))
                }
            },
            None,
        )?;

        let update = match twin {
            Some((absorbed, _)) => {
                self.lines.retain(|line| line.id != absorbed);
                debug!(line = %id, %absorbed, "Merged cart lines after price change");
                LineUpdate::Merged { absorbed }
            }
            None => LineUpdate::Updated,
        };

        if let Some(line) = self.line_mut(id) {
            line.quantity = merged_quantity;
            line.unit_price = price;
        }
        debug!(line = %id, %price, "Set custom price");
        Ok(update)
    }

    /// Check that the cart total stays representable after a change.
    ///
    /// `project` gives each existing line's quantity and unit price after the
    /// change (`None` drops the line); `added` is a line about to be appended.
    fn ensure_total_fits(
        &self,
        project: impl Fn(&LineItem) -> Option<(u32, Decimal)>,
        added: Option<(u32, Decimal)>,
    ) -> Result<(), CartError> {
        self.lines
            .iter()
            .filter_map(project)
            .chain(added)
            .try_fold(Decimal::ZERO, |total, (quantity, unit_price)| {
                Decimal::from(quantity)
                    .checked_mul(unit_price)
                    .and_then(|line_total| total.checked_add(line_total))
            })
            .map(|_| ())
            .ok_or(CartError::AmountTooLarge)
    }

    /// Sum of `quantity × unit_price` over all lines.
    ///
    /// Computed from the current lines on every call; nothing is cached.
    /// Every mutation checks that this sum is representable before applying,
    /// so it cannot overflow.
    #[must_use]
    pub fn compute_total(&self) -> Decimal {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// The total as a [`Price`] in the cart currency.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::new(self.compute_total(), self.currency)
    }

    /// Remove every line. Line ids are not reused afterwards.
    pub fn clear(&mut self) {
        let cleared = self.lines.len();
        self.lines.clear();
        debug!(cleared, "Cleared cart");
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.lines
    }

    /// Look up a line by id.
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id == id)
    }

    fn line_mut(&mut self, id: LineId) -> Option<&mut LineItem> {
        self.lines.iter_mut().find(|line| line.id == id)
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }

    /// The currency totals are reported in.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }
}

fn validate_price(price: Decimal) -> Result<(), CartError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CartError::InvalidPrice(price));
    }
    Ok(())
}
