//! Typed ID definitions for the objects the scheduler bookkeeps.
//!
//! All three IDs originate in the cluster state store and are carried on
//! the task/node descriptors the scheduler receives from its event feed.

use crate::define_id;

define_id!(NodeId);
define_id!(TaskId);
define_id!(ServiceId);
