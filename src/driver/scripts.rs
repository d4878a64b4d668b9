//! JavaScript snippets executed in the page
//!
//! Shared by the HTTP binding and the mock driver, which recognizes them by
//! identity.

/// Document ready state
pub const READY_STATE: &str = "return document.readyState";

/// Pending jQuery requests; zero when the page has no jQuery
pub const JQUERY_ACTIVE: &str =
    "return (typeof jQuery !== 'undefined' && jQuery.active) ? jQuery.active : 0";

/// Scroll the first argument into view
pub const SCROLL_INTO_VIEW: &str =
    "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'}); return null;";

/// Submit the form enclosing the first argument
pub const SUBMIT_FORM: &str = r#"
var el = arguments[0];
var form = el.tagName === 'FORM' ? el : el.form;
if (!form) { return false; }
if (typeof form.requestSubmit === 'function') { form.requestSubmit(); } else { form.submit(); }
return true;
"#;

/// Select an option on `<select>` arguments[0] by mode arguments[1] and key arguments[2]
pub const SELECT_OPTION: &str = r#"
var select = arguments[0], mode = arguments[1], key = arguments[2];
var options = select.options || [];
for (var i = 0; i < options.length; i++) {
    var opt = options[i];
    var hit = (mode === 'text' && opt.text.trim() === key)
        || (mode === 'value' && opt.value === key)
        || (mode === 'index' && i === key);
    if (hit) {
        select.selectedIndex = i;
        select.dispatchEvent(new Event('input', {bubbles: true}));
        select.dispatchEvent(new Event('change', {bubbles: true}));
        return true;
    }
}
return false;
"#;

/// Selected option of `<select>` arguments[0] as `[text, value]`, or null
pub const SELECTED_OPTION: &str = r#"
var select = arguments[0];
if (!select.options || select.selectedIndex < 0) { return null; }
var opt = select.options[select.selectedIndex];
return [opt.text.trim(), opt.value];
"#;
