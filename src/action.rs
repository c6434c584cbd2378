use crate::watch::RefreshEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Start watching a pid at the default interval.
    Watch(u32),
    OpenPicker,
    ClosePicker,
    PickerMove(isize),
    PickerCycleInterval,
    UpdateFilter(String),
    PickerConfirm,
    Export,
    CycleTheme,
    ToggleHelp,
    Sampler(RefreshEvent),
    None,
}
