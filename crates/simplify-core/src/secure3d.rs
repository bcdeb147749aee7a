//! 3-D Secure 1.0 helpers.
//!
//! The browser part of the flow lives outside this crate. What is here is the
//! data handling on either side of it: pulling the ACS parameters out of a card
//! token, producing the page that posts them, and reading the result the page
//! redirects back with.

use reqwest::Url;

use crate::decoder::decode_str;
use crate::error::{Result, SimplifyError};
use crate::path::Path;
use crate::value::Value;

/// Scheme of the redirect the challenge page ends with.
pub const REDIRECT_SCHEME: &str = "simplifysdk";

/// Query item holding the JSON result.
pub const RESULT_QUERY_ITEM: &str = "result";

/// Reported when the redirect carries no readable result.
pub const UNREADABLE_RESULT_MESSAGE: &str = "Unable to read 3DS result";

fn secure3d_data() -> Path {
    Path::root().key("card").key("secure3DData")
}

/// Whether the tokenized card must go through a 3-D Secure challenge.
pub fn is_enrolled(card_token: &Value) -> bool {
    card_token
        .at(&secure3d_data().key("isEnrolled"))
        .bool_value()
        .unwrap_or(false)
}

/// The parameters posted to the card issuer's access control server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secure3dChallenge {
    pub acs_url: String,
    pub pa_req: String,
    pub md: String,
    pub term_url: String,
}

impl Secure3dChallenge {
    /// Read the challenge out of a card token returned by the API.
    ///
    /// # Errors
    /// [`SimplifyError::MissingField`] naming the first field that is absent
    /// or not a scalar.
    pub fn from_card_token(card_token: &Value) -> Result<Self> {
        let field = |name: &str| {
            card_token
                .at(&secure3d_data().key(name))
                .string_value()
                .ok_or_else(|| SimplifyError::MissingField(format!("card.secure3DData.{name}")))
        };
        Ok(Self {
            acs_url: field("acsUrl")?,
            pa_req: field("paReq")?,
            md: field("md")?,
            term_url: field("termUrl")?,
        })
    }

    /// A page that posts the challenge to the ACS inside a full-screen iframe
    /// and forwards the ACS `message` event to a `simplifysdk://secure3d`
    /// redirect.
    pub fn html(&self) -> String {
        let form = format!(
            "<form id='challenge' method='post' enctype='application/x-www-form-urlencoded' action='{acs_url}'>\
             <input type='hidden' name='PaReq' value='{pa_req}' />\
             <input type='hidden' name='MD' value='{md}' />\
             <input type='hidden' name='TermUrl' value='{term_url}' />\
             </form>",
            acs_url = escape_html(&self.acs_url),
            pa_req = escape_html(&self.pa_req),
            md = escape_html(&self.md),
            term_url = escape_html(&self.term_url),
        );
        // Attribute-escaped markup, then quoted as a JS string literal.
        let form = serde_json::Value::String(form).to_string();

        format!(
            r#"<!DOCTYPE html>
<html lang="en" dir="ltr">
<head><meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0, shrink-to-fit=no">
<script>
window.onload = function() {{
  var html = {form};
  var iframe = document.getElementById('iframe');
  var doc = iframe.contentDocument || iframe.document;
  doc.open();
  doc.writeln(html);
  doc.close();
  doc.getElementById('challenge').submit();
}};
window.addEventListener("message", function(evt) {{
  window.location.href = '{REDIRECT_SCHEME}://secure3d?{RESULT_QUERY_ITEM}=' + encodeURIComponent(evt.data);
}}, false);
</script>
</head>
<body style="margin: 0;">
<iframe id="iframe" style="display:block; border:none; width:100vw; height:100vh;"></iframe>
</body>
</html>
"#
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// How a 3-D Secure challenge ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Secure3dOutcome {
    /// The ACS answered; `true` when the cardholder was authenticated.
    Authenticated(bool),
    /// The ACS reported an error, or its answer could not be read.
    Failed(String),
}

impl Secure3dOutcome {
    /// Interpret a navigation. Returns `None` for URLs that are not the
    /// challenge page's redirect, which the browser should simply follow.
    pub fn from_redirect(url: &Url) -> Option<Self> {
        if url.scheme() != REDIRECT_SCHEME {
            return None;
        }
        let outcome = url
            .query_pairs()
            .find(|(name, _)| name == RESULT_QUERY_ITEM)
            .map_or_else(
                || Self::Failed(UNREADABLE_RESULT_MESSAGE.to_string()),
                |(_, result)| Self::from_result(&result),
            );
        Some(outcome)
    }

    /// Interpret the JSON document the ACS posted back.
    pub fn from_result(result: &str) -> Self {
        let value = decode_str(result).unwrap_or_default();
        let secure3d = value.get("secure3d");
        match secure3d.get("authenticated").bool_value() {
            Some(authenticated) => Self::Authenticated(authenticated),
            None => Self::Failed(
                secure3d
                    .get("error")
                    .string_value()
                    .unwrap_or_else(|| UNREADABLE_RESULT_MESSAGE.to_string()),
            ),
        }
    }
}
