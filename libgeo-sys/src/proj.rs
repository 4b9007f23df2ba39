use libc::{c_char, c_double, c_int, c_void, size_t};

// https://proj.org/en/stable/development/reference/functions.html

#[repr(C)]
pub struct PJconsts {
    _unused: [u8; 0],
}
pub type PJ = PJconsts;

#[repr(C)]
pub struct pj_ctx {
    _unused: [u8; 0],
}
pub type PJ_CONTEXT = pj_ctx;

#[repr(C)]
pub struct PJ_AREA {
    _unused: [u8; 0],
}

pub mod PJ_DIRECTION {
    pub type Type = libc::c_int;
    pub const PJ_FWD: Type = 1;
    pub const PJ_IDENT: Type = 0;
    pub const PJ_INV: Type = -1;
}

pub mod PJ_LOG_LEVEL {
    pub type Type = libc::c_int;
    pub const PJ_LOG_NONE: Type = 0;
    pub const PJ_LOG_ERROR: Type = 1;
    pub const PJ_LOG_DEBUG: Type = 2;
    pub const PJ_LOG_TRACE: Type = 3;
    pub const PJ_LOG_TELL: Type = 4;
}

pub mod PJ_PROJ_STRING_TYPE {
    pub type Type = libc::c_int;
    pub const PJ_PROJ_5: Type = 0;
    pub const PJ_PROJ_4: Type = 1;
}

pub type PJ_LOG_FUNCTION =
    Option<unsafe extern "C" fn(app_data: *mut c_void, level: c_int, msg: *const c_char)>;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PJ_INFO {
    pub major: c_int,
    pub minor: c_int,
    pub patch: c_int,
    pub release: *const c_char,
    pub version: *const c_char,
    pub searchpath: *const c_char,
    pub paths: *const *const c_char,
    pub path_count: size_t,
}

extern "C" {
    pub fn proj_info() -> PJ_INFO;

    // contexts
    pub fn proj_context_create() -> *mut PJ_CONTEXT;
    pub fn proj_context_destroy(ctx: *mut PJ_CONTEXT) -> *mut PJ_CONTEXT;
    pub fn proj_context_set_search_paths(
        ctx: *mut PJ_CONTEXT,
        count_paths: c_int,
        paths: *const *const c_char,
    );
    pub fn proj_log_level(ctx: *mut PJ_CONTEXT, log_level: PJ_LOG_LEVEL::Type) -> PJ_LOG_LEVEL::Type;
    pub fn proj_log_func(ctx: *mut PJ_CONTEXT, app_data: *mut c_void, logf: PJ_LOG_FUNCTION);

    // objects
    pub fn proj_create(ctx: *mut PJ_CONTEXT, definition: *const c_char) -> *mut PJ;
    pub fn proj_destroy(p: *mut PJ) -> *mut PJ;
    pub fn proj_create_crs_to_crs_from_pj(
        ctx: *mut PJ_CONTEXT,
        source_crs: *const PJ,
        target_crs: *const PJ,
        area: *mut PJ_AREA,
        options: *const *const c_char,
    ) -> *mut PJ;
    pub fn proj_normalize_for_visualization(ctx: *mut PJ_CONTEXT, obj: *const PJ) -> *mut PJ;
    pub fn proj_is_crs(obj: *const PJ) -> c_int;
    pub fn proj_get_name(obj: *const PJ) -> *const c_char;
    pub fn proj_as_proj_string(
        ctx: *mut PJ_CONTEXT,
        obj: *const PJ,
        string_type: PJ_PROJ_STRING_TYPE::Type,
        options: *const *const c_char,
    ) -> *const c_char;

    // coordinate operations
    pub fn proj_trans_generic(
        p: *mut PJ,
        direction: PJ_DIRECTION::Type,
        x: *mut c_double,
        sx: size_t,
        nx: size_t,
        y: *mut c_double,
        sy: size_t,
        ny: size_t,
        z: *mut c_double,
        sz: size_t,
        nz: size_t,
        t: *mut c_double,
        st: size_t,
        nt: size_t,
    ) -> size_t;

    // errors
    pub fn proj_errno(p: *const PJ) -> c_int;
    pub fn proj_errno_reset(p: *const PJ) -> c_int;
    pub fn proj_context_errno(ctx: *mut PJ_CONTEXT) -> c_int;
    pub fn proj_errno_string(err: c_int) -> *const c_char;
}

#[cfg(proj_ge_8)]
extern "C" {
    pub fn proj_context_errno_string(ctx: *mut PJ_CONTEXT, err: c_int) -> *const c_char;
}
