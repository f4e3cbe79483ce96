//! 第三方资源访问（图片服务器）。

pub(crate) mod media_fetch;
