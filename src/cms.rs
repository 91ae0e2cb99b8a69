//! CMS page state: the upload and edit modals, and event deletion.

use crate::api::{ApiError, PhotoEventApi};

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this event? This action cannot be undone.";

/// View state for the CMS page. Modal toggles are purely presentational and
/// idempotent; the edit modal additionally carries its submission target.
#[derive(Debug, Default)]
pub struct CmsView {
    upload_modal_open: bool,
    edit_modal_open: bool,
    edit_action: Option<String>,
    edit_event_field: Option<String>,
}

impl CmsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_upload_modal(&mut self) {
        self.upload_modal_open = true;
    }

    pub fn close_upload_modal(&mut self) {
        self.upload_modal_open = false;
    }

    pub fn upload_modal_open(&self) -> bool {
        self.upload_modal_open
    }

    /// Point the edit form at `event_id` and reveal the modal. Both the
    /// action path and the hidden id field are written before the modal is
    /// marked visible, so a submission can never target a stale event.
    pub fn open_edit_modal(&mut self, event_id: &str) {
        self.edit_action = Some(format!("/cms/edit-event/{event_id}"));
        self.edit_event_field = Some(event_id.to_string());
        self.edit_modal_open = true;
    }

    pub fn close_edit_modal(&mut self) {
        self.edit_modal_open = false;
    }

    pub fn edit_modal_open(&self) -> bool {
        self.edit_modal_open
    }

    /// The parameterized submission target, available only while the edit
    /// modal is open: `(action path, event id field)`.
    pub fn edit_target(&self) -> Option<(&str, &str)> {
        if !self.edit_modal_open {
            return None;
        }
        match (&self.edit_action, &self.edit_event_field) {
            (Some(action), Some(id)) => Some((action.as_str(), id.as_str())),
            _ => None,
        }
    }

    /// Submit the open edit form.
    pub fn submit_edit(
        &self,
        api: &impl PhotoEventApi,
        fields: &[(String, String)],
    ) -> Result<(), ApiError> {
        let (_, event_id) = self
            .edit_target()
            .ok_or_else(|| ApiError::Server("no event selected for editing".to_string()))?;
        api.edit_event(event_id, fields)
    }
}

/// Delete `event_id` after interactive confirmation. Declining performs no
/// action at all. Returns whether the delete was issued.
pub fn delete_event(
    api: &impl PhotoEventApi,
    event_id: &str,
    confirm: impl FnOnce(&str) -> bool,
) -> Result<bool, ApiError> {
    if !confirm(DELETE_PROMPT) {
        return Ok(false);
    }
    api.delete_event(event_id)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MatchResult, PhotoId, PhotoRef};
    use std::cell::RefCell;

    #[derive(Default)]
    struct StubApi {
        deletes: RefCell<Vec<String>>,
        edits: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl PhotoEventApi for StubApi {
        fn login(&self, _e: &str, _p: &str) -> Result<String, ApiError> {
            unimplemented!()
        }
        fn register(&self, _t: &str, _e: &str, _p: &str, _r: &str) -> Result<(), ApiError> {
            unimplemented!()
        }
        fn edit_event(&self, event_id: &str, fields: &[(String, String)]) -> Result<(), ApiError> {
            self.edits
                .borrow_mut()
                .push((event_id.to_string(), fields.to_vec()));
            Ok(())
        }
        fn delete_event(&self, event_id: &str) -> Result<(), ApiError> {
            self.deletes.borrow_mut().push(event_id.to_string());
            Ok(())
        }
        fn selfie_match(&self, _d: &str, _n: &str, _e: &str) -> Result<Vec<MatchResult>, ApiError> {
            unimplemented!()
        }
        fn all_images(&self, _e: &str) -> Result<Vec<PhotoRef>, ApiError> {
            unimplemented!()
        }
        fn image_url(&self, id: PhotoId) -> String {
            format!("/download/image/{id}")
        }
        fn image_available(&self, _id: PhotoId) -> bool {
            true
        }
    }

    #[test]
    fn declining_confirmation_issues_no_request() {
        let api = StubApi::default();
        let issued = delete_event(&api, "42", |_| false).unwrap();
        assert!(!issued);
        assert!(api.deletes.borrow().is_empty());
    }

    #[test]
    fn confirming_issues_exactly_one_delete() {
        let api = StubApi::default();
        let issued = delete_event(&api, "42", |prompt| {
            assert_eq!(prompt, DELETE_PROMPT);
            true
        })
        .unwrap();
        assert!(issued);
        assert_eq!(*api.deletes.borrow(), vec!["42".to_string()]);
    }

    #[test]
    fn edit_modal_sets_target_before_visibility() {
        let mut view = CmsView::new();
        assert!(view.edit_target().is_none());

        view.open_edit_modal("7");
        assert!(view.edit_modal_open());
        let (action, id) = view.edit_target().unwrap();
        assert_eq!(action, "/cms/edit-event/7");
        assert_eq!(id, "7");

        view.close_edit_modal();
        assert!(view.edit_target().is_none());
    }

    #[test]
    fn reopening_edit_modal_retargets_the_form() {
        let mut view = CmsView::new();
        view.open_edit_modal("7");
        view.close_edit_modal();
        view.open_edit_modal("9");
        assert_eq!(view.edit_target().unwrap().0, "/cms/edit-event/9");
    }

    #[test]
    fn submit_edit_requires_an_open_modal() {
        let api = StubApi::default();
        let view = CmsView::new();
        assert!(view.submit_edit(&api, &[]).is_err());
        assert!(api.edits.borrow().is_empty());
    }

    #[test]
    fn submit_edit_posts_to_the_selected_event() {
        let api = StubApi::default();
        let mut view = CmsView::new();
        view.open_edit_modal("7");
        let fields = vec![("name".to_string(), "Gala".to_string())];
        view.submit_edit(&api, &fields).unwrap();
        let edits = api.edits.borrow();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, "7");
        assert_eq!(edits[0].1, fields);
    }

    #[test]
    fn upload_modal_toggles_are_idempotent() {
        let mut view = CmsView::new();
        view.open_upload_modal();
        view.open_upload_modal();
        assert!(view.upload_modal_open());
        view.close_upload_modal();
        view.close_upload_modal();
        assert!(!view.upload_modal_open());
    }
}
