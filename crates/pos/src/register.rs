//! The register: routes UI commands to the cart, catalog and checkout.
//!
//! Front ends translate clicks, key presses and typed input into
//! [`Command`]s and render whatever [`Register`] exposes afterwards. Commands
//! run one at a time in dispatch order; a rejected command returns an error
//! and leaves every piece of state as it was.

use minibar_core::{CategoryFilter, LineId, Product};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::cart::{Cart, CartError, LineUpdate};
use crate::catalog::Catalog;
use crate::checkout::{self, CheckoutError, OrderExporter, OrderSnapshot};

/// Errors returned by [`Register::dispatch`].
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("No tab {0} (choose 1-{max})", max = CategoryFilter::TAB_COUNT)]
    InvalidTab(usize),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// A user action, already parsed into typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add one unit of a product, optionally at a custom price.
    Add {
        product: String,
        price: Option<Decimal>,
    },
    Remove(LineId),
    SetQuantity {
        line: LineId,
        quantity: i64,
    },
    Increment(LineId),
    Decrement(LineId),
    SetCustomPrice {
        line: LineId,
        price: Decimal,
    },
    /// Empty the cart without checking out.
    Clear,
    Checkout,
    /// Switch the catalog view to a 1-based tab.
    SelectTab(usize),
    /// Filter the catalog view by name; an empty query clears the filter.
    Search(String),
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Short notification for the user.
    pub message: String,
    /// The finalized order, for [`Command::Checkout`].
    pub order: Option<OrderSnapshot>,
}

impl Outcome {
    fn notify(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            order: None,
        }
    }
}

/// Owns the cart and catalog for one register session.
pub struct Register {
    catalog: Catalog,
    cart: Cart,
    exporter: Box<dyn OrderExporter>,
    tab: CategoryFilter,
    query: String,
}

impl std::fmt::Debug for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Register")
            .field("catalog", &self.catalog.len())
            .field("cart", &self.cart)
            .field("tab", &self.tab)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl Register {
    /// Create a register with an empty cart priced in the catalog currency.
    #[must_use]
    pub fn new(catalog: Catalog, exporter: Box<dyn OrderExporter>) -> Self {
        let cart = Cart::new(catalog.currency());
        Self {
            catalog,
            cart,
            exporter,
            tab: CategoryFilter::All,
            query: String::new(),
        }
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Returns a [`RegisterError`] if the command is rejected; state is
    /// unchanged in that case.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, RegisterError> {
        debug!(?command, "Dispatching command");
        match command {
            Command::Add { product, price } => self.add(&product, price),
            Command::Remove(line) => {
                let update = self.cart.remove_item(line);
                Ok(self.describe(line, update))
            }
            Command::SetQuantity { line, quantity } => {
                let update = self.cart.set_quantity(line, quantity)?;
                Ok(self.describe(line, update))
            }
            Command::Increment(line) => {
                let update = self.cart.increment(line)?;
                Ok(self.describe(line, update))
            }
            Command::Decrement(line) => {
                let update = self.cart.decrement(line);
                Ok(self.describe(line, update))
            }
            Command::SetCustomPrice { line, price } => {
                let update = self.cart.set_custom_price(line, price)?;
                Ok(self.describe(line, update))
            }
            Command::Clear => {
                self.cart.clear();
                Ok(Outcome::notify("Cart cleared"))
            }
            Command::Checkout => self.checkout(),
            Command::SelectTab(index) => {
                let filter =
                    CategoryFilter::from_tab(index).ok_or(RegisterError::InvalidTab(index))?;
                self.tab = filter;
                Ok(Outcome::notify(format!("Showing {filter}")))
            }
            Command::Search(query) => {
                self.query = query.trim().to_string();
                let hits = self.visible_products().len();
                Ok(Outcome::notify(format!("{hits} product(s) found")))
            }
        }
    }

    fn add(&mut self, name: &str, price: Option<Decimal>) -> Result<Outcome, RegisterError> {
        let product = self
            .catalog
            .get(name)
            .ok_or_else(|| RegisterError::UnknownProduct(name.trim().to_string()))?;
        let line = match price {
            Some(price) => self.cart.add_item_at(product, price)?,
            None => self.cart.add_item(product)?,
        };
        let name = product.name().to_string();
        Ok(Outcome::notify(format!("{name} added (line {line})")))
    }

    fn checkout(&mut self) -> Result<Outcome, RegisterError> {
        let (order, receipt) = checkout::checkout(&mut self.cart, self.exporter.as_mut())?;
        info!(order_id = %order.id, "Order finalized");
        Ok(Outcome {
            message: format!("Order completed, total {}. {}", order.total, receipt.message),
            order: Some(order),
        })
    }

    fn describe(&self, line: LineId, update: LineUpdate) -> Outcome {
        let message = match update {
            LineUpdate::Updated => match self.cart.line(line) {
                Some(item) => format!(
                    "Line {line}: {} x {} @ {}",
                    item.quantity(),
                    item.product().name(),
                    item.unit_price()
                ),
                None => format!("Line {line} updated"),
            },
            LineUpdate::Removed => format!("Line {line} removed"),
            LineUpdate::Merged { absorbed } => format!("Line {absorbed} merged into line {line}"),
            LineUpdate::NotFound => format!("Line {line} is not in the cart"),
        };
        Outcome::notify(message)
    }

    /// Swap in a freshly loaded catalog.
    ///
    /// Lines already in the cart keep the product data they were added with.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        info!(products = catalog.len(), "Catalog refreshed");
        self.catalog = catalog;
    }

    /// Products visible under the current tab and search query.
    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        self.catalog.search(&self.query, self.tab)
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The selected catalog tab.
    #[must_use]
    pub const fn tab(&self) -> CategoryFilter {
        self.tab
    }

    /// Checkout is only offered for a non-empty cart.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        !self.cart.is_empty()
    }
}
