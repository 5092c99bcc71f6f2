//! Generated-source preamble
//!
//! Everything the wrappers lean on at runtime: compile-time switches
//! (colors, threads, log file, timestamps, indentation) keyed off the
//! symbol prefix, the `dlopen` helper with its double-checked `GET_SYM`
//! resolution macro, and the per-type formatter and checker families.
//!
//! The text is one template with `{prefix}`, `{header}`, `{libname}` and
//! `{progname}` markers; everything else is emitted verbatim, so the output
//! is deterministic for a given context.

use std::fmt::Write;

use super::GenContext;

pub fn emit(out: &mut String, ctx: &GenContext) {
    let text = TEMPLATE
        .replace("{prefix}", &ctx.prefix)
        .replace("{header}", &ctx.header)
        .replace("{libname}", &ctx.libname)
        .replace("{progname}", &ctx.progname);
    out.push_str(&text);

    if let Some(headers) = ctx.config.get("global", "headers") {
        for header in headers.split(',') {
            let _ = writeln!(out, "#include <{}>", header.trim());
        }
    }
    if let Some(overrides) = ctx.config.get("global", "overrides") {
        for include in overrides.split(',') {
            let _ = writeln!(out, "#include \"{}\"", include.trim());
        }
    }
}

const TEMPLATE: &str = r#"
/* this file was auto-generated from {header} by {progname}. */

#include <{header}>
#include <stdio.h>
#include <dlfcn.h>
#include <string.h>
#include <errno.h>

#ifdef {prefix}_USE_COLORS
#define {prefix}_COLOR_ERROR "\033[1;31m"
#define {prefix}_COLOR_WARN "\033[1;33m"
#define {prefix}_COLOR_OK "\033[1;32m"
#define {prefix}_COLOR_ENTER "\033[1;36m"
#define {prefix}_COLOR_EXIT "\033[1;35m"
#define {prefix}_COLOR_CLEAR "\033[0m"
#else
#define {prefix}_COLOR_ERROR ""
#define {prefix}_COLOR_WARN ""
#define {prefix}_COLOR_OK ""
#define {prefix}_COLOR_ENTER ""
#define {prefix}_COLOR_EXIT ""
#define {prefix}_COLOR_CLEAR ""
#endif

#ifdef {prefix}_HAVE_THREADS
#include <pthread.h>
static pthread_mutex_t {prefix}_th_mutex = PTHREAD_MUTEX_INITIALIZER;
static pthread_t {prefix}_th_main = 0;
static unsigned char {prefix}_th_initted = 0;
#define {prefix}_THREADS_INIT \
    do { \
        pthread_mutex_lock(&{prefix}_th_mutex); \
        if (!{prefix}_th_initted) { \
            {prefix}_th_initted = 1; \
            {prefix}_th_main = pthread_self(); \
        } \
        pthread_mutex_unlock(&{prefix}_th_mutex); \
    } while(0)
#define {prefix}_IS_MAIN_THREAD ({prefix}_th_main == pthread_self())
#define {prefix}_THREAD_ID ((unsigned long)pthread_self())
#define {prefix}_LOCK pthread_mutex_lock(&{prefix}_th_mutex)
#define {prefix}_UNLOCK pthread_mutex_unlock(&{prefix}_th_mutex)
#define {prefix}_THREAD_LOCAL __thread
#else
#define {prefix}_THREADS_INIT do{}while(0)
#define {prefix}_IS_MAIN_THREAD (1)
#define {prefix}_THREAD_ID (0UL)
#define {prefix}_LOCK do{}while(0)
#define {prefix}_UNLOCK do{}while(0)
#define {prefix}_THREAD_LOCAL
#endif

#ifdef {prefix}_LOGFILE
static FILE *{prefix}_log_fp = NULL;
#define {prefix}_LOG_PREPARE \
    do { if (!{prefix}_log_fp) {prefix}_log_prepare(); } while (0)

static void {prefix}_log_prepare(void)
{
    {prefix}_LOCK;
    if (!{prefix}_log_fp) {
        {prefix}_log_fp = fopen({prefix}_LOGFILE, "a+");
        if (!{prefix}_log_fp) {
            fprintf(stderr,
                    {prefix}_COLOR_ERROR
                    "ERROR: could not open logfile %s: %s."
                    " Using stderr!\n"
                    {prefix}_COLOR_CLEAR,
                    {prefix}_LOGFILE, strerror(errno));
            {prefix}_log_fp = stderr;
        }
    }
    {prefix}_UNLOCK;
}
#else
static FILE *{prefix}_log_fp = NULL;
#define {prefix}_LOG_PREPARE \
    do{ if (!{prefix}_log_fp) {prefix}_log_fp = stderr; }while(0)
#endif

#ifdef {prefix}_LOG_TIMESTAMP
#ifdef {prefix}_LOG_TIMESTAMP_CLOCK_GETTIME
#include <time.h>

#ifndef {prefix}_LOG_TIMESTAMP_CLOCK_SOURCE
#define {prefix}_LOG_TIMESTAMP_CLOCK_SOURCE CLOCK_MONOTONIC
#endif

#define {prefix}_LOG_TIMESTAMP_SHOW \
    do { \
        struct timespec ts = {0, 0}; \
        clock_gettime({prefix}_LOG_TIMESTAMP_CLOCK_SOURCE, &ts); \
        fprintf({prefix}_log_fp, "[%5lu.%06lu] ", \
                (unsigned long)ts.tv_sec, \
                (unsigned long)ts.tv_nsec / 1000); \
    } while (0)

#else /* fallback to gettimeofday() */

#include <sys/time.h>
#define {prefix}_LOG_TIMESTAMP_SHOW \
    do { \
        struct timeval tv = {0, 0}; \
        gettimeofday(&tv, NULL); \
        fprintf({prefix}_log_fp, "[%5lu.%06lu] ", \
                (unsigned long)tv.tv_sec, \
                (unsigned long)tv.tv_usec); \
    } while (0)

#endif
#else
#define {prefix}_LOG_TIMESTAMP_SHOW do{}while(0)
#endif

static void *{prefix}_dl_handle = NULL;

static unsigned char {prefix}_dl_prepare(void)
{
    unsigned char ok;

    {prefix}_THREADS_INIT;

    {prefix}_LOCK;
    ok = !!{prefix}_dl_handle;
    if (!ok) {
        char *errmsg;
        {prefix}_dl_handle = dlopen("{libname}", RTLD_LAZY);
        errmsg = dlerror();
        if (errmsg) {
            {prefix}_dl_handle = NULL;
            fprintf(stderr,
                    {prefix}_COLOR_ERROR
                    "ERROR: could not dlopen({libname}): %s\n"
                    {prefix}_COLOR_CLEAR, errmsg);
        }
        ok = !!{prefix}_dl_handle;
    }
    {prefix}_UNLOCK;

    return ok;
}

#define {prefix}_GET_SYM(v, name, ...) \
    do { \
        if (!{prefix}_dl_handle) { \
            if (!{prefix}_dl_prepare()) \
                return __VA_ARGS__; \
        } \
        {prefix}_LOCK; \
        if (!v) { \
            char *{prefix}_dl_err; \
            v = dlsym({prefix}_dl_handle, name); \
            {prefix}_dl_err = dlerror(); \
            if ({prefix}_dl_err) { \
                fprintf(stderr, \
                        {prefix}_COLOR_ERROR \
                        "ERROR: could not dlsym(%s): %s\n" \
                        {prefix}_COLOR_CLEAR, \
                        name, {prefix}_dl_err); \
            } \
        } \
        {prefix}_UNLOCK; \
        if (!v) \
            return __VA_ARGS__; \
    } while (0)


static inline void {prefix}_log_params_begin(void)
{
    putc('(', {prefix}_log_fp);
}

static inline void {prefix}_log_param_continue(void)
{
    fputs(", ", {prefix}_log_fp);
}

static inline void {prefix}_log_params_end(void)
{
    putc(')', {prefix}_log_fp);
}

#ifdef {prefix}_LOG_INDENT
static {prefix}_THREAD_LOCAL int {prefix}_log_indentation = 0;
#endif

static inline void {prefix}_log_enter_start(const char *name)
{
    {prefix}_LOG_PREPARE;
    {prefix}_LOCK;

    {prefix}_LOG_TIMESTAMP_SHOW;

#ifdef {prefix}_LOG_INDENT
    int i;

    for (i = 0; i < {prefix}_log_indentation; i++)
        fputs({prefix}_LOG_INDENT, {prefix}_log_fp);
    {prefix}_log_indentation++;
#endif

    if (!{prefix}_IS_MAIN_THREAD)
        fprintf({prefix}_log_fp, "[T:%lu]", {prefix}_THREAD_ID);

    fprintf({prefix}_log_fp, {prefix}_COLOR_ENTER "LOG> %s", name);
}

static inline void {prefix}_log_enter_end(const char *name)
{
    fputs({prefix}_COLOR_CLEAR "\n", {prefix}_log_fp);
    fflush({prefix}_log_fp);
    {prefix}_UNLOCK;
    (void)name;
}

static inline void {prefix}_log_exit_start(const char *name)
{
    {prefix}_LOG_PREPARE;
    {prefix}_LOCK;

    {prefix}_LOG_TIMESTAMP_SHOW;

#ifdef {prefix}_LOG_INDENT
    int i;

    {prefix}_log_indentation--;
    for (i = 0; i < {prefix}_log_indentation; i++)
        fputs({prefix}_LOG_INDENT, {prefix}_log_fp);
#endif

    if (!{prefix}_IS_MAIN_THREAD)
        fprintf({prefix}_log_fp, "[T:%lu]", {prefix}_THREAD_ID);
    fprintf({prefix}_log_fp, {prefix}_COLOR_EXIT "LOG< %s", name);
}

static inline void {prefix}_log_exit_return(void)
{
    fputs(" = ", {prefix}_log_fp);
}

static inline void {prefix}_log_exit_end(const char *name)
{
    fputs({prefix}_COLOR_CLEAR "\n", {prefix}_log_fp);
    fflush({prefix}_log_fp);
    {prefix}_UNLOCK;
    (void)name;
}

static inline void {prefix}_log_fmt_int(FILE *p, const char *type, const char *name, int value)
{
    if (name)
        fprintf(p, "%s %s=%d", type, name, value);
    else
        fprintf(p, "(%s)%d", type, value);
}

static inline void {prefix}_log_fmt_uint(FILE *p, const char *type, const char *name, unsigned int value)
{
    if (name)
        fprintf(p, "%s %s=%u", type, name, value);
    else
        fprintf(p, "(%s)%u", type, value);
}

static inline void {prefix}_log_fmt_hex_int(FILE *p, const char *type, const char *name, int value)
{
    if (name)
        fprintf(p, "%s %s=%#x", type, name, value);
    else
        fprintf(p, "(%s)%#x", type, value);
}

static inline void {prefix}_log_fmt_errno(FILE *p, const char *type, const char *name, int value)
{
    const char *msg;
    switch (value) {
        case E2BIG: msg = "E2BIG"; break;
        case EACCES: msg = "EACCES"; break;
        case EADDRINUSE: msg = "EADDRINUSE"; break;
        case EADDRNOTAVAIL: msg = "EADDRNOTAVAIL"; break;
        case EAFNOSUPPORT: msg = "EAFNOSUPPORT"; break;
        case EAGAIN: msg = "EAGAIN"; break;
        case EALREADY: msg = "EALREADY"; break;
        case EBADF: msg = "EBADF"; break;
        case EBADMSG: msg = "EBADMSG"; break;
        case EBUSY: msg = "EBUSY"; break;
        case ECANCELED: msg = "ECANCELED"; break;
        case ECHILD: msg = "ECHILD"; break;
        case ECONNABORTED: msg = "ECONNABORTED"; break;
        case ECONNREFUSED: msg = "ECONNREFUSED"; break;
        case ECONNRESET: msg = "ECONNRESET"; break;
        case EDEADLK: msg = "EDEADLK"; break;
        case EDESTADDRREQ: msg = "EDESTADDRREQ"; break;
        case EDOM: msg = "EDOM"; break;
        case EDQUOT: msg = "EDQUOT"; break;
        case EEXIST: msg = "EEXIST"; break;
        case EFAULT: msg = "EFAULT"; break;
        case EFBIG: msg = "EFBIG"; break;
        case EHOSTUNREACH: msg = "EHOSTUNREACH"; break;
        case EIDRM: msg = "EIDRM"; break;
        case EILSEQ: msg = "EILSEQ"; break;
        case EINPROGRESS: msg = "EINPROGRESS"; break;
        case EINTR: msg = "EINTR"; break;
        case EINVAL: msg = "EINVAL"; break;
        case EIO: msg = "EIO"; break;
        case EISCONN: msg = "EISCONN"; break;
        case EISDIR: msg = "EISDIR"; break;
        case ELOOP: msg = "ELOOP"; break;
        case EMFILE: msg = "EMFILE"; break;
        case EMLINK: msg = "EMLINK"; break;
        case EMSGSIZE: msg = "EMSGSIZE"; break;
        case EMULTIHOP: msg = "EMULTIHOP"; break;
        case ENAMETOOLONG: msg = "ENAMETOOLONG"; break;
        case ENETDOWN: msg = "ENETDOWN"; break;
        case ENETRESET: msg = "ENETRESET"; break;
        case ENETUNREACH: msg = "ENETUNREACH"; break;
        case ENFILE: msg = "ENFILE"; break;
        case ENOBUFS: msg = "ENOBUFS"; break;
        case ENODATA: msg = "ENODATA"; break;
        case ENODEV: msg = "ENODEV"; break;
        case ENOENT: msg = "ENOENT"; break;
        case ENOEXEC: msg = "ENOEXEC"; break;
        case ENOLCK: msg = "ENOLCK"; break;
        case ENOLINK: msg = "ENOLINK"; break;
        case ENOMEM: msg = "ENOMEM"; break;
        case ENOMSG: msg = "ENOMSG"; break;
        case ENOPROTOOPT: msg = "ENOPROTOOPT"; break;
        case ENOSPC: msg = "ENOSPC"; break;
        case ENOSR: msg = "ENOSR"; break;
        case ENOSTR: msg = "ENOSTR"; break;
        case ENOSYS: msg = "ENOSYS"; break;
        case ENOTCONN: msg = "ENOTCONN"; break;
        case ENOTDIR: msg = "ENOTDIR"; break;
        case ENOTEMPTY: msg = "ENOTEMPTY"; break;
        case ENOTSOCK: msg = "ENOTSOCK"; break;
        case ENOTSUP: msg = "ENOTSUP"; break;
        case ENOTTY: msg = "ENOTTY"; break;
        case ENXIO: msg = "ENXIO"; break;
        case EOVERFLOW: msg = "EOVERFLOW"; break;
        case EPERM: msg = "EPERM"; break;
        case EPIPE: msg = "EPIPE"; break;
        case EPROTO: msg = "EPROTO"; break;
        case EPROTONOSUPPORT: msg = "EPROTONOSUPPORT"; break;
        case EPROTOTYPE: msg = "EPROTOTYPE"; break;
        case ERANGE: msg = "ERANGE"; break;
        case EROFS: msg = "EROFS"; break;
        case ESPIPE: msg = "ESPIPE"; break;
        case ESRCH: msg = "ESRCH"; break;
        case ESTALE: msg = "ESTALE"; break;
        case ETIME: msg = "ETIME"; break;
        case ETIMEDOUT: msg = "ETIMEDOUT"; break;
        case ETXTBSY: msg = "ETXTBSY"; break;
        case EXDEV: msg = "EXDEV"; break;
        default: msg = "?UNKNOWN?";
    };
    if (name)
        fprintf(p, "%s %s=%d %s", type, name, value, msg);
    else
        fprintf(p, "(%s)%d %s", type, value, msg);
}

static inline void {prefix}_log_fmt_octal_int(FILE *p, const char *type, const char *name, int value)
{
    if (name)
        fprintf(p, "%s %s=%#o", type, name, value);
    else
        fprintf(p, "(%s)%#o", type, value);
}

static inline void {prefix}_log_fmt_char(FILE *p, const char *type, const char *name, char value)
{
    if (name)
        fprintf(p, "%s %s=%hhd (%c)", type, name, value, value);
    else
        fprintf(p, "(%s)%hhd (%c)", type, value, value);
}

static inline void {prefix}_log_fmt_uchar(FILE *p, const char *type, const char *name, unsigned char value)
{
    if (name)
        fprintf(p, "%s %s=%hhu", type, name, value);
    else
        fprintf(p, "(%s)%hhu", type, value);
}

static inline void {prefix}_log_fmt_hex_char(FILE *p, const char *type, const char *name, char value)
{
    if (name)
        fprintf(p, "%s %s=%#hhx (%c)", type, name, value, value);
    else
        fprintf(p, "(%s)%#hhx (%c)", type, value, value);
}

static inline void {prefix}_log_fmt_octal_char(FILE *p, const char *type, const char *name, char value)
{
    if (name)
        fprintf(p, "%s %s=%#hho (%c)", type, name, value, value);
    else
        fprintf(p, "(%s)%#hho (%c)", type, value, value);
}

static inline void {prefix}_log_fmt_short(FILE *p, const char *type, const char *name, short value)
{
    if (name)
        fprintf(p, "%s %s=%hd", type, name, value);
    else
        fprintf(p, "(%s)%hd", type, value);
}

static inline void {prefix}_log_fmt_ushort(FILE *p, const char *type, const char *name, unsigned short value)
{
    if (name)
        fprintf(p, "%s %s=%hu", type, name, value);
    else
        fprintf(p, "(%s)%hu", type, value);
}

static inline void {prefix}_log_fmt_hex_short(FILE *p, const char *type, const char *name, short value)
{
    if (name)
        fprintf(p, "%s %s=%#hx", type, name, value);
    else
        fprintf(p, "(%s)%#hx", type, value);
}

static inline void {prefix}_log_fmt_long(FILE *p, const char *type, const char *name, long value)
{
    if (name)
        fprintf(p, "%s %s=%ld", type, name, value);
    else
        fprintf(p, "(%s)%ld", type, value);
}

static inline void {prefix}_log_fmt_ulong(FILE *p, const char *type, const char *name, unsigned long value)
{
    if (name)
        fprintf(p, "%s %s=%lu", type, name, value);
    else
        fprintf(p, "(%s)%lu", type, value);
}

static inline void {prefix}_log_fmt_hex_long(FILE *p, const char *type, const char *name, long value)
{
    if (name)
        fprintf(p, "%s %s=%#lx", type, name, value);
    else
        fprintf(p, "(%s)%#lx", type, value);
}

static inline void {prefix}_log_fmt_long_long(FILE *p, const char *type, const char *name, long long value)
{
    if (name)
        fprintf(p, "%s %s=%lld", type, name, value);
    else
        fprintf(p, "(%s)%lld", type, value);
}

static inline void {prefix}_log_fmt_ulong_long(FILE *p, const char *type, const char *name, unsigned long long value)
{
    if (name)
        fprintf(p, "%s %s=%llu", type, name, value);
    else
        fprintf(p, "(%s)%llu", type, value);
}

static inline void {prefix}_log_fmt_hex_long_long(FILE *p, const char *type, const char *name, long long value)
{
    if (name)
        fprintf(p, "%s %s=%#llx", type, name, value);
    else
        fprintf(p, "(%s)%#llx", type, value);
}

static inline void {prefix}_log_fmt_bool(FILE *p, const char *type, const char *name, int value)
{
    if (name)
        fprintf(p, "%s %s=%s", type, name, value ? "true" : "false");
    else
        fprintf(p, "(%s)%s", type, value ? "true" : "false");
}

static inline void {prefix}_log_fmt_string(FILE *p, const char *type, const char *name, const char *value)
{
    if (name) {
        if (value)
            fprintf(p, "%s %s=\"%s\"", type, name, value);
        else
            fprintf(p, "%s %s=(null)", type, name);
    } else {
        if (value)
            fprintf(p, "(%s)\"%s\"", type, value);
        else
            fprintf(p, "(%s)(null)", type);
    }
}

static inline void {prefix}_log_fmt_double(FILE *p, const char *type, const char *name, double value)
{
    if (name)
        fprintf(p, "%s %s=%g", type, name, value);
    else
        fprintf(p, "(%s)%g", type, value);
}

static inline void {prefix}_log_fmt_pointer(FILE *p, const char *type, const char *name, const void *value)
{
    if (name)
        fprintf(p, "%s %s=%p", type, name, value);
    else
        fprintf(p, "(%s)%p", type, value);
}

static inline void {prefix}_log_checker_null(FILE *p, const char *type, const void *value)
{
    if (value) fputs({prefix}_COLOR_ERROR "NULL was expected", p);
    (void)type;
}

static inline void {prefix}_log_checker_non_null(FILE *p, const char *type, const void *value)
{
    if (!value) fputs({prefix}_COLOR_ERROR "non-NULL was expected", p);
    (void)type;
}

static inline void {prefix}_log_checker_zero(FILE *p, const char *type, long long value)
{
    if (value) fputs({prefix}_COLOR_ERROR "ZERO was expected", p);
    (void)type;
}

static inline void {prefix}_log_checker_non_zero(FILE *p, const char *type, long long value)
{
    if (!value) fputs({prefix}_COLOR_ERROR "non-ZERO was expected", p);
    (void)type;
}

static inline void {prefix}_log_checker_false(FILE *p, const char *type, long long value)
{
    if (value) fputs({prefix}_COLOR_ERROR "FALSE was expected", p);
    (void)type;
}

static inline void {prefix}_log_checker_true(FILE *p, const char *type, long long value)
{
    if (!value) fputs({prefix}_COLOR_ERROR "TRUE was expected", p);
    (void)type;
}

static inline void {prefix}_log_checker_errno(FILE *p, const char *type, long long value)
{
    if (errno) fprintf(p, {prefix}_COLOR_ERROR "%s", strerror(errno));
    (void)type;
    (void)value;
}

"#;
