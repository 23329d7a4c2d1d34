pub(crate) const LHEF: &str = "LesHouchesEvents";
pub(crate) const LHEF_TAG_OPEN: &str = "<LesHouchesEvents version=";
pub(crate) const LHEF_LAST_LINE: &str = "</LesHouchesEvents>";
pub(crate) const VERSION: &str = "version";

pub(crate) const HEADER: &str = "header";

pub(crate) const INIT: &str = "init";
pub(crate) const INIT_START: &str = "<init>";
pub(crate) const INIT_END: &str = "</init>";

pub(crate) const INITRWGT: &str = "initrwgt";
pub(crate) const WEIGHTGROUP: &str = "weightgroup";
pub(crate) const WEIGHT: &str = "weight";
pub(crate) const ID: &str = "id";

pub(crate) const EVENT: &str = "event";
pub(crate) const EVENT_START: &str = "<event";
pub(crate) const EVENT_END: &str = "</event>";

pub(crate) const WEIGHTS: &str = "weights";
pub(crate) const RWGT: &str = "rwgt";
pub(crate) const WGT: &str = "wgt";

pub(crate) const COMMENT_START: char = '#';
