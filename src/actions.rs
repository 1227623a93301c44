/// Every button of the toolbar, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EnterQuery,
    ExecQuery,
    Save,
    ClearAll,
    Reports,
    InvEntry,
    ClientInfo,
    ConsultantInfo,
    ConsultantEntry,
    PaymentsEntry,
    AddEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Wired,
    EntryCollector,
    Unimplemented,
}

pub const TOOLBAR: [Action; 11] = [
    Action::EnterQuery,
    Action::ExecQuery,
    Action::Save,
    Action::ClearAll,
    Action::Reports,
    Action::InvEntry,
    Action::ClientInfo,
    Action::ConsultantInfo,
    Action::ConsultantEntry,
    Action::PaymentsEntry,
    Action::AddEntry,
];

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::EnterQuery => "Enter Query",
            Action::ExecQuery => "Exec Query",
            Action::Save => "Save",
            Action::ClearAll => "Clear All",
            Action::Reports => "Reports",
            Action::InvEntry => "Inv Entry",
            Action::ClientInfo => "Client Info",
            Action::ConsultantInfo => "Consultant Info",
            Action::ConsultantEntry => "Consultant Entry",
            Action::PaymentsEntry => "Payments Entry",
            Action::AddEntry => "Add Entry",
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::ClearAll | Action::Reports => ActionKind::Wired,
            Action::AddEntry => ActionKind::EntryCollector,
            _ => ActionKind::Unimplemented,
        }
    }
}
