//! Terminal host for the pages: prints notices and navigation, and renders
//! views as plain text.

use ums_core::{ListView, Navigator, Notifier, UserRecord, UserRow, ValidationErrors};

#[derive(Debug, Default)]
pub struct Terminal;

impl Navigator for Terminal {
    fn navigate(&self, path: &str) {
        println!("{}", navigation_line(path));
    }
}

pub fn navigation_line(path: &str) -> String {
    format!("-> {path}")
}

impl Notifier for Terminal {
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

pub fn render_list(title: &str, view: &ListView, create_path: &str) -> String {
    let mut out = format!("{title}\n\n");
    match view {
        ListView::Loading => out.push_str("Loading users...\n"),
        ListView::Failed { message, hint } => {
            out.push_str(&format!("Error: {message}\n{hint}\n"));
            out.push_str(&format!("+ Create New User: {create_path}\n"));
        }
        ListView::Empty => {
            out.push_str("No users found.\n");
            out.push_str(&format!("+ Create New User: {create_path}\n"));
        }
        ListView::Table(rows) => out.push_str(&render_table(rows)),
    }
    out
}

fn render_table(rows: &[UserRow]) -> String {
    let cells: Vec<[&str; 6]> = rows
        .iter()
        .map(|r| {
            [
                r.username.as_str(),
                r.email.as_str(),
                r.full_name.as_str(),
                r.phone.as_str(),
                r.status,
                r.edit_path.as_str(),
            ]
        })
        .collect();

    let mut widths = UserRow::HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cols: [&str; 6]| {
        let padded: Vec<String> = cols
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(UserRow::HEADERS);
    for row in cells {
        out.push_str(&line(row));
    }
    out
}

pub fn render_user(user: &UserRecord) -> String {
    let row = UserRow::from_record(user);
    let roles = user.roles.as_deref().map(|r| r.join(", ")).unwrap_or_default();
    format!(
        "id:        {}\nusername:  {}\nemail:     {}\nname:      {}\nphone:     {}\nstatus:    {}\nroles:     {}\ncreated:   {}\nupdated:   {}\n",
        row.id,
        row.username,
        row.email,
        row.full_name,
        row.phone,
        row.status,
        roles,
        user.created_at.to_rfc3339(),
        user.updated_at.to_rfc3339(),
    )
}

pub fn render_errors(errors: &ValidationErrors) -> String {
    errors
        .errors
        .iter()
        .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}\n")))
        .collect()
}
