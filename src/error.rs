/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed recents record: {0}")]
    Record(#[source] serde_json::Error),

    #[error("invalid options: {0}")]
    Config(#[source] serde_json::Error),
}
