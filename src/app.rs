use crate::auth::EntryPage;
use crate::console::Console;
use crate::error::ClientError;
use crate::models::Role;
use crate::state::AppState;
use crate::student::StudentPage;
use crate::teacher::TeacherPage;
use tracing::debug;

/// Top-level screens. Leaving a page drops all of its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Entry,
    Student,
    Teacher,
    Exit,
}

impl Page {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Student => Page::Student,
            Role::Teacher => Page::Teacher,
        }
    }
}

/// Moves between pages until one of them asks to exit. A protected page
/// without a matching session sends the user back to the entry page.
pub async fn navigate<C: Console>(state: &AppState, console: &mut C, start: Page) -> Result<(), ClientError> {
    let mut page = start;
    loop {
        debug!(?page, "opening page");
        page = match page {
            Page::Entry => EntryPage::new(state).run(console).await?,
            Page::Student => match StudentPage::open(state) {
                Some(mut student) => student.run(console).await?,
                None => Page::Entry,
            },
            Page::Teacher => match TeacherPage::open(state) {
                Some(mut teacher) => teacher.run(console).await?,
                None => Page::Entry,
            },
            Page::Exit => return Ok(()),
        };
    }
}

/// Page to start on: the current session's page, or the entry page.
pub fn landing_page(state: &AppState) -> Page {
    state
        .sessions
        .current()
        .map(|user| Page::for_role(user.role))
        .unwrap_or(Page::Entry)
}
