//! HTML rendering for the list page.

use std::fmt::Write;

use super::model::TodoItem;
use crate::flash::{Flash, FlashLevel};

const STYLE: &str = "\
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
.flash { padding: .5rem 1rem; border-radius: 4px; }
.flash.success { background: #e6f4ea; color: #1e4620; }
.flash.error { background: #fdecea; color: #611a15; }
.todo { border-bottom: 1px solid #ddd; padding: .75rem 0; }
.todo.complete .title { text-decoration: line-through; color: #777; }
form.inline { display: inline; }";

/// Render the full list page.
pub fn render_index(todos: &[TodoItem], flash: Option<&Flash>) -> String {
    let mut html = String::with_capacity(1024 + todos.len() * 512);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>To Do List</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n<h1>To Do List</h1>\n");

    if let Some(flash) = flash {
        let class = match flash.level {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        };
        let _ = writeln!(
            html,
            "<p class=\"flash {class}\" role=\"status\">{}</p>",
            escape(&flash.message)
        );
    }

    html.push_str(
        "<form method=\"post\" action=\"/add\">\n\
         <input type=\"text\" name=\"title\" placeholder=\"Enter a to-do...\" required>\n\
         <button type=\"submit\">Add</button>\n</form>\n",
    );

    if todos.is_empty() {
        html.push_str("<p class=\"empty\">Nothing to do.</p>\n");
    }

    for todo in todos {
        render_todo(&mut html, todo);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_todo(html: &mut String, todo: &TodoItem) {
    let id = todo.id;
    let title = escape(&todo.title);
    let (state_class, status) = if todo.complete {
        ("complete", "Completed")
    } else {
        ("open", "Not Complete")
    };

    let _ = writeln!(
        html,
        "<div class=\"todo {state_class}\" data-id=\"{id}\">\n\
         <p><span class=\"id\">{id}</span> <span class=\"title\">{title}</span> \
         <span class=\"status\">{status}</span></p>"
    );
    let _ = writeln!(
        html,
        "<form class=\"inline\" method=\"post\" action=\"/update\">\n\
         <input type=\"hidden\" name=\"todo_id\" value=\"{id}\">\n\
         <input type=\"text\" name=\"title\" value=\"{title}\" required>\n\
         <button type=\"submit\">Update</button>\n</form>"
    );
    if !todo.complete {
        let _ = writeln!(
            html,
            "<form class=\"inline\" method=\"post\" action=\"/complete/{id}\">\
             <button type=\"submit\">Complete</button></form>"
        );
    }
    let _ = writeln!(
        html,
        "<form class=\"inline\" method=\"post\" action=\"/delete/{id}\">\
         <button type=\"submit\">Delete</button></form>\n</div>"
    );
}

/// Escape text for element content and quoted attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
