//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! # List every product
//! strivo catalog list
//!
//! # List one category
//! strivo catalog list --category running
//!
//! # Show one product
//! strivo catalog show 4
//! ```

use std::io::Write;

use strivo_core::{Catalog, CategoryFilter, Product, ProductId};

use super::CliError;

/// List products, optionally restricted to one category slug.
///
/// An unknown slug lists nothing, like the storefront's filter bar.
pub fn list(catalog: &Catalog, category: Option<&str>, out: &mut impl Write) -> Result<(), CliError> {
    let filter = category.map_or(CategoryFilter::All, CategoryFilter::parse);
    let products = catalog.filter(&filter);

    if products.is_empty() {
        writeln!(out, "No products in category '{}'", filter.slug())?;
        return Ok(());
    }

    for product in products {
        writeln!(
            out,
            "{:>3}  {:<36} {:<12} {}",
            product.id,
            product.name,
            product.category.label(),
            product.price
        )?;
    }
    Ok(())
}

/// Show one product in full.
pub fn show(catalog: &Catalog, id: ProductId, out: &mut impl Write) -> Result<(), CliError> {
    let product = catalog.get(id).ok_or(CliError::ProductNotFound(id))?;
    write_product(product, out)
}

fn write_product(product: &Product, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{} (#{})", product.name, product.id)?;
    writeln!(out, "  Category: {}", product.category.label())?;
    writeln!(out, "  Price:    {}", product.price)?;
    if product.is_sized() {
        writeln!(out, "  Sizes:    S, M, L, XL")?;
    }
    writeln!(out, "  Image:    {}", product.image)?;
    writeln!(out)?;
    writeln!(out, "{}", product.description)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<(), CliError>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_all() {
        let catalog = Catalog::bundled().unwrap();
        let output = render(|out| list(&catalog, None, out));
        assert_eq!(output.lines().count(), catalog.len());
    }

    #[test]
    fn test_list_category() {
        let catalog = Catalog::bundled().unwrap();
        let output = render(|out| list(&catalog, Some("baloncesto"), out));
        assert_eq!(output.lines().count(), 3);
        assert!(output.lines().all(|line| line.contains("Baloncesto")));
    }

    #[test]
    fn test_list_unknown_category() {
        let catalog = Catalog::bundled().unwrap();
        let output = render(|out| list(&catalog, Some("golf"), out));
        assert!(output.starts_with("No products"));
    }

    #[test]
    fn test_show() {
        let catalog = Catalog::bundled().unwrap();
        let product = catalog.get(ProductId::new(1)).unwrap().clone();
        let output = render(|out| show(&catalog, product.id, out));
        assert!(output.starts_with(&product.name));
        assert!(output.contains(&product.price.to_string()));
    }

    #[test]
    fn test_show_unknown() {
        let catalog = Catalog::bundled().unwrap();
        let err = show(&catalog, ProductId::new(999), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::ProductNotFound(_)));
    }
}
