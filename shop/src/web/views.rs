// src/web/views.rs

//! Server-rendered HTML pages.

use rust_decimal::Decimal;
use std::fmt;

use crate::models::{OrderSummary, Product};
use crate::services::cart_service::CartView;
use crate::services::catalog::{CatalogFilter, PriceBand};

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// HTML-escapes its contents when displayed.
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for ch in self.0.chars() {
      match ch {
        '&' => f.write_str("&amp;")?,
        '<' => f.write_str("&lt;")?,
        '>' => f.write_str("&gt;")?,
        '"' => f.write_str("&quot;")?,
        '\'' => f.write_str("&#39;")?,
        _ => write!(f, "{}", ch)?,
      }
    }
    Ok(())
  }
}

pub fn money(amount: Decimal, currency: &str) -> String {
  let mut rounded = amount.round_dp(2);
  rounded.rescale(2);
  format!("{} {}", currency.to_uppercase(), rounded)
}

fn layout(title: &str, cart_count: u32, body: &str) -> String {
  format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Simple Shop</title>
</head>
<body>
<header>
<a href="/" class="brand">Simple Shop</a>
<a href="/cart" class="cart-link">Cart (<span class="cart-count">{cart_count}</span>)</a>
</header>
<main>
{body}
</main>
</body>
</html>
"#,
    title = Escaped(title),
    cart_count = cart_count,
    body = body
  )
}

fn selected(is_selected: bool) -> &'static str {
  if is_selected {
    " selected"
  } else {
    ""
  }
}

fn add_to_cart_form(product_id: i64) -> String {
  format!(
    r#"<form method="post" action="/cart/add" class="add-to-cart">
<input type="hidden" name="product_id" value="{product_id}">
<input type="number" name="qty" value="1" min="1" max="999">
<button type="submit">Add to cart</button>
</form>"#
  )
}

pub fn catalog_page(
  products: &[Product],
  categories: &[String],
  filter: &CatalogFilter,
  currency: &str,
  cart_count: u32,
) -> String {
  let query = filter.query.as_deref().unwrap_or("");
  let mut body = String::new();

  body.push_str(&format!(
    r#"<form method="get" action="/" class="filters">
<input type="search" name="q" placeholder="Search products" value="{}">
<select name="category"><option value="">All categories</option>"#,
    Escaped(query)
  ));
  for category in categories {
    let is_selected = filter.category.as_deref() == Some(category.as_str());
    body.push_str(&format!(
      r#"<option value="{0}"{1}>{0}</option>"#,
      Escaped(category),
      selected(is_selected)
    ));
  }
  body.push_str(r#"</select><select name="price"><option value="">Any price</option>"#);
  for (band, label) in [
    (PriceBand::Low, "Up to 500"),
    (PriceBand::Mid, "500 to 1000"),
    (PriceBand::High, "1000 to 5000"),
  ] {
    body.push_str(&format!(
      r#"<option value="{}"{}>{}</option>"#,
      band.as_str(),
      selected(filter.price_band == Some(band)),
      label
    ));
  }
  body.push_str("</select><button type=\"submit\">Filter</button></form>\n");

  if products.is_empty() {
    body.push_str("<p class=\"empty\">No products match your filters.</p>\n");
  } else {
    body.push_str("<ul class=\"products\">\n");
    for product in products {
      body.push_str(&format!(
        r#"<li class="product" data-product-id="{id}">
<a href="/products/{id}"><img src="{image}" alt="{name}"></a>
<h2><a href="/products/{id}">{name}</a></h2>
<p class="price">{price}</p>
{form}
</li>
"#,
        id = product.id,
        image = Escaped(product.image_url.as_deref().unwrap_or("")),
        name = Escaped(&product.name),
        price = money(product.price(), currency),
        form = add_to_cart_form(product.id)
      ));
    }
    body.push_str("</ul>\n");
  }
  layout("Catalog", cart_count, &body)
}

pub fn product_page(product: &Product, currency: &str, cart_count: u32) -> String {
  let body = format!(
    r#"<article class="product-detail" data-product-id="{id}">
<img src="{image}" alt="{name}">
<h1>{name}</h1>
<p class="category">{category}</p>
<p class="price">{price}</p>
<p class="description">{description}</p>
{form}
</article>
"#,
    id = product.id,
    image = Escaped(product.image_url.as_deref().unwrap_or("")),
    name = Escaped(&product.name),
    category = Escaped(product.category.as_deref().unwrap_or("")),
    price = money(product.price(), currency),
    description = Escaped(product.description.as_deref().unwrap_or("")),
    form = add_to_cart_form(product.id)
  );
  layout(&product.name, cart_count, &body)
}

pub fn cart_page(cart: &CartView, currency: &str) -> String {
  let mut body = String::from("<h1>Your cart</h1>\n");
  if cart.is_empty() {
    body.push_str("<p class=\"empty\">Your cart is empty. <a href=\"/\">Keep shopping</a></p>\n");
    return layout("Cart", 0, &body);
  }

  body.push_str("<table class=\"cart\">\n<tr><th>Product</th><th>Price</th><th>Qty</th><th>Total</th><th></th></tr>\n");
  for line in &cart.lines {
    body.push_str(&format!(
      r#"<tr data-product-id="{id}">
<td><a href="/products/{id}">{name}</a></td>
<td>{price}</td>
<td class="qty">{qty}</td>
<td class="line-total">{total}</td>
<td>
<form method="post" action="/cart/remove"><input type="hidden" name="product_id" value="{id}"><input type="hidden" name="qty" value="1"><button type="submit">Remove one</button></form>
<form method="post" action="/cart/remove"><input type="hidden" name="product_id" value="{id}"><input type="hidden" name="qty" value="{qty}"><button type="submit">Remove all</button></form>
</td>
</tr>
"#,
      id = line.product.id,
      name = Escaped(&line.product.name),
      price = money(line.product.price(), currency),
      qty = line.quantity,
      total = money(line.line_total, currency)
    ));
  }
  body.push_str(&format!(
    r#"</table>
<p class="subtotal">Subtotal: <strong>{}</strong></p>
<form method="post" action="/cart/clear"><button type="submit">Clear cart</button></form>
<form method="post" action="/checkout"><button type="submit">Checkout</button></form>
"#,
    money(cart.subtotal, currency)
  ));
  layout("Cart", cart.item_count, &body)
}

pub fn checkout_success_page(summary: &OrderSummary) -> String {
  let mut body = format!(
    "<h1>Thank you for your order!</h1>\n<p class=\"order-id\">Order #{}</p>\n",
    summary.order_id
  );
  if summary.simulated {
    body.push_str("<p class=\"notice\">Payment was simulated; no charge was made.</p>\n");
  }
  body.push_str("<ul class=\"order-lines\">\n");
  for line in &summary.lines {
    body.push_str(&format!(
      "<li>{} &times; {} <span class=\"line-total\">{}</span></li>\n",
      Escaped(&line.product_name),
      line.quantity,
      money(line.line_total, &summary.currency)
    ));
  }
  body.push_str(&format!(
    "</ul>\n<p class=\"subtotal\">Subtotal: <strong>{}</strong></p>\n<a href=\"/\">Continue shopping</a>\n",
    money(summary.subtotal, &summary.currency)
  ));
  layout("Order confirmed", 0, &body)
}

pub fn error_page(status: u16, message: &str) -> String {
  let body = format!(
    "<h1>Error {}</h1>\n<p class=\"error-message\">{}</p>\n<a href=\"/\">Back to the shop</a>\n",
    status,
    Escaped(message)
  );
  layout("Error", 0, &body)
}
