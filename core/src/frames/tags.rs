use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Multi-frame Module
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}
