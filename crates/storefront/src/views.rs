//! Display models for templates.
//!
//! Templates never see core types directly: prices are pre-formatted and
//! identifiers flattened to what the markup needs.

use strivo_core::{
    CartSummary, Category, CategoryFilter, LineSummary, Product, Size, ValidationErrors,
};
use strivo_core::subscription::{Field, SubscriptionInput};

/// Product card and detail data.
#[derive(Clone, Debug)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub category_slug: &'static str,
    pub category_label: &'static str,
    pub price: String,
    pub image: String,
    pub description: String,
    /// Whether the add form shows the size selector.
    pub sized: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category_slug: product.category.slug(),
            category_label: product.category.label(),
            price: product.price.display(),
            image: product.image.clone(),
            description: product.description.clone(),
            sized: product.is_sized(),
        }
    }
}

/// Size radio button for the add form.
#[derive(Clone, Debug)]
pub struct SizeOption {
    pub label: &'static str,
    pub checked: bool,
}

/// Size options with the default pre-selected.
#[must_use]
pub fn size_options() -> Vec<SizeOption> {
    Size::ALL
        .into_iter()
        .map(|size| SizeOption {
            label: size.as_str(),
            checked: size == Size::DEFAULT,
        })
        .collect()
}

/// Category filter button.
#[derive(Clone, Debug)]
pub struct FilterButton {
    pub slug: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// The "all" button followed by one button per category.
#[must_use]
pub fn filter_buttons(active: &CategoryFilter) -> Vec<FilterButton> {
    let all = FilterButton {
        slug: "all",
        label: "Todos",
        active: *active == CategoryFilter::All,
    };
    std::iter::once(all)
        .chain(Category::ALL.into_iter().map(|category| FilterButton {
            slug: category.slug(),
            label: category.label(),
            active: *active == CategoryFilter::Only(category),
        }))
        .collect()
}

/// Cart line display data.
#[derive(Clone, Debug)]
pub struct CartLineView {
    pub line_id: i32,
    pub name: String,
    pub image: String,
    pub size: Option<&'static str>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&LineSummary> for CartLineView {
    fn from(line: &LineSummary) -> Self {
        Self {
            line_id: line.line_id.as_i32(),
            name: line.name.clone(),
            image: line.image.clone(),
            size: line.size.map(|size| size.as_str()),
            quantity: line.quantity.get(),
            unit_price: line.unit_price.display(),
            line_total: line.line_total.display(),
        }
    }
}

/// Cart display data.
#[derive(Clone, Debug)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&CartSummary> for CartView {
    fn from(summary: &CartSummary) -> Self {
        Self {
            lines: summary.lines.iter().map(CartLineView::from).collect(),
            total: summary.total.display(),
            item_count: summary.item_count,
        }
    }
}

/// Interest option in the subscription form.
#[derive(Clone, Debug)]
pub struct InterestOption {
    pub slug: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Subscription form state: submitted values plus per-field errors.
#[derive(Clone, Debug)]
pub struct SubscribeFormView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub accept_terms: bool,
    pub interests: Vec<InterestOption>,
    pub first_name_error: Option<String>,
    pub last_name_error: Option<String>,
    pub email_error: Option<String>,
    pub accept_terms_error: Option<String>,
    pub interests_error: Option<String>,
}

impl Default for SubscribeFormView {
    fn default() -> Self {
        Self::new(&SubscriptionInput::default(), &ValidationErrors::default())
    }
}

impl SubscribeFormView {
    /// Re-populate the form after a failed submission.
    #[must_use]
    pub fn new(input: &SubscriptionInput, errors: &ValidationErrors) -> Self {
        let error = |field: Field| errors.get(field).map(ToString::to_string);
        Self {
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            accept_terms: input.accept_terms,
            interests: Category::ALL
                .into_iter()
                .map(|category| InterestOption {
                    slug: category.slug(),
                    label: category.label(),
                    selected: input.interests.iter().any(|s| s == category.slug()),
                })
                .collect(),
            first_name_error: error(Field::FirstName),
            last_name_error: error(Field::LastName),
            email_error: error(Field::Email),
            accept_terms_error: error(Field::AcceptTerms),
            interests_error: error(Field::Interests),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use strivo_core::{Cart, Catalog, ProductId, Quantity, subscription};

    use super::*;

    #[test]
    fn test_product_view() {
        let catalog = Catalog::bundled().unwrap();
        let view = ProductView::from(catalog.get(ProductId::new(12)).unwrap());
        assert_eq!(view.price, "$\u{a0}749.900");
        assert_eq!(view.category_label, "Baloncesto");
        assert!(!view.sized);
    }

    #[test]
    fn test_filter_buttons_mark_active() {
        let buttons = filter_buttons(&CategoryFilter::Only(Category::Running));
        assert_eq!(buttons.len(), 5);
        assert_eq!(buttons[0].slug, "all");
        let active: Vec<&str> = buttons.iter().filter(|b| b.active).map(|b| b.slug).collect();
        assert_eq!(active, vec!["running"]);

        let buttons = filter_buttons(&CategoryFilter::Unknown("tenis".to_string()));
        assert!(buttons.iter().all(|b| !b.active));
    }

    #[test]
    fn test_size_options_default_checked() {
        let options = size_options();
        let checked: Vec<&str> = options.iter().filter(|o| o.checked).map(|o| o.label).collect();
        assert_eq!(checked, vec!["S"]);
    }

    #[test]
    fn test_cart_view() {
        let catalog = Catalog::bundled().unwrap();
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), Quantity::new(2).unwrap(), None);
        cart.add(ProductId::new(4), Quantity::ONE, Some(Size::M));

        let view = CartView::from(&CartSummary::project(&cart, &catalog));
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "$\u{a0}565.700");
        assert_eq!(view.lines[0].line_total, "$\u{a0}319.800");
        assert_eq!(view.lines[1].size, Some("M"));
        assert!(!view.is_empty());
    }

    #[test]
    fn test_subscribe_form_view_errors() {
        let input = SubscriptionInput {
            first_name: String::new(),
            email: "ana@example.com".to_string(),
            interests: vec!["futbol".to_string()],
            ..SubscriptionInput::default()
        };
        let errors = subscription::validate(&input).unwrap_err();
        let view = SubscribeFormView::new(&input, &errors);

        assert!(view.first_name_error.is_some());
        assert!(view.email_error.is_none());
        assert!(view.accept_terms_error.is_some());
        assert!(view.interests[0].selected);
        assert!(!view.interests[1].selected);
    }
}
