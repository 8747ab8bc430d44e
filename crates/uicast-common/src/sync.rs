use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

static POISON_RECOVERIES: AtomicU64 = AtomicU64::new(0);

/// Number of poisoned-lock recoveries since process start.
pub fn poison_recovery_count() -> u64 {
    POISON_RECOVERIES.load(Ordering::Relaxed)
}

pub fn rwlock_read_or_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
        eprintln!("Warning: recovering from poisoned rwlock (read)");
        poisoned.into_inner()
    })
}

pub fn rwlock_write_or_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
        eprintln!("Warning: recovering from poisoned rwlock (write)");
        poisoned.into_inner()
    })
}

pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
        eprintln!("Warning: recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_mutex_recover_after_panic() {
        let lock = Arc::new(Mutex::new(7u32));
        let lock2 = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = lock2.lock().unwrap();
            panic!("poison it");
        })
        .join();

        let guard = mutex_lock_or_recover(&lock);
        assert_eq!(*guard, 7);
    }

    #[test]
    fn test_rwlock_recover_after_panic() {
        let lock = Arc::new(RwLock::new(vec![1, 2, 3]));
        let lock2 = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = lock2.write().unwrap();
            panic!("poison it");
        })
        .join();

        assert_eq!(rwlock_read_or_recover(&lock).len(), 3);
        rwlock_write_or_recover(&lock).push(4);
        assert_eq!(rwlock_read_or_recover(&lock).len(), 4);
    }

    #[test]
    fn test_recovery_count_increments() {
        let before = poison_recovery_count();
        let lock = Arc::new(Mutex::new(0u8));
        let lock2 = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = lock2.lock().unwrap();
            panic!("poison it");
        })
        .join();
        drop(mutex_lock_or_recover(&lock));
        assert!(poison_recovery_count() > before);
    }
}
