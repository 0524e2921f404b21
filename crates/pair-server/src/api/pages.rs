//! HTML pages served by the pairing site.

/// Escape a string for interpolation into HTML text content.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The landing form collecting a phone number (and a key when gated).
pub fn form_page(gated: bool) -> String {
    let key_field = if gated {
        r#"<input name="key" type="password" placeholder="Access key" required style="padding:10px;width:260px;margin:10px"/><br/>"#
    } else {
        ""
    };

    format!(
        r#"<center style="font-family:system-ui,Arial;">
  <h2>&#129302; WhatsApp Pair Code Generator</h2>
  <form action="/pair" method="get">
    <label><b>Phone number (with country code, no +)</b></label><br/>
    <input name="number" placeholder="9477XXXXXXX" required style="padding:10px;width:260px;margin:10px"/><br/>
    {key_field}<button type="submit" style="padding:10px 20px;background:#008000;color:#fff;border:none;border-radius:6px">Get Pair Code</button>
  </form>
  <p style="color:gray;font-size:13px;">Example: 94771234567 (no +). Keep this page open until pairing completes.</p>
</center>"#
    )
}

/// The success page showing the issued code and linking instructions.
pub fn code_page(number: &str, code: &str) -> String {
    format!(
        r#"<center style="font-family:system-ui,Arial;">
  <h2>&#128273; Pair code for {number}</h2>
  <h1 style="font-size:44px;color:#0b6623;margin:10px 0">{code}</h1>
  <p>Open WhatsApp &rarr; Linked Devices &rarr; Link a device &rarr; Pair with phone number &rarr; Enter this code</p>
  <p style="color:gray">Keep this page open. Wait ~5-15s after entering the code for the session to be saved.</p>
  <hr style="width:60%;margin:20px auto">
  <p style="font-size:12px;color:#666">Once paired, the credential folder on the server holds everything your bot needs. Copy its contents to the bot deployment.</p>
</center>"#,
        number = escape(number),
        code = escape(code),
    )
}

/// A rendered failure page.
pub fn error_page(title: &str, message: &str, hint: &str) -> String {
    format!(
        r#"<center style="font-family:system-ui,Arial;">
  <h2>&#10060; {title}</h2>
  <p>{message}</p>
  <p style="color:gray;font-size:13px;">{hint}</p>
  <p><a href="/">Back</a></p>
</center>"#,
        title = escape(title),
        message = escape(message),
        hint = escape(hint),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_page_key_field_only_when_gated() {
        assert!(form_page(true).contains("name=\"key\""));
        assert!(!form_page(false).contains("name=\"key\""));
    }

    #[test]
    fn test_code_page_contains_code_and_number() {
        let page = code_page("94771234567", "XKCD-1234");
        assert!(page.contains("XKCD-1234"));
        assert!(page.contains("94771234567"));
        assert!(page.contains("Linked Devices"));
    }

    #[test]
    fn test_error_page_escapes_markup() {
        let page = error_page("Oops", "<script>alert(1)</script>", "hint");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
